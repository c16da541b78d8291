fn main() {
    unipkg::run_cli();
}
