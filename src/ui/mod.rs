use colored::Colorize;
use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use terminal_size::{Width, terminal_size};

pub mod observer;
pub mod progress;

pub use observer::ConsoleObserver;

static QUIET: AtomicBool = AtomicBool::new(false);

/// Disable colors when stdout is not a terminal or `NO_COLOR` is set.
pub fn init_colors() {
    if std::env::var_os("NO_COLOR").is_some() || !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }
}

/// Suppress informational output (used for json/yaml output).
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::SeqCst);
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::SeqCst)
}

pub fn header(title: &str) {
    if !is_quiet() {
        println!("\n{}", title.bold().underline());
    }
}

pub fn success(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "✓".green().bold(), msg);
    }
}

pub fn info(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "ℹ".blue().bold(), msg);
    }
}

pub fn warning(msg: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

pub fn keyval(key: &str, val: &str) {
    println!("{}: {}", key.bold(), val);
}

pub fn indent(msg: &str, level: usize) {
    let spaces = " ".repeat(level * 2);
    println!("{}{}", spaces, msg);
}

pub fn prompt_yes_no(question: &str) -> bool {
    print!("{} {} [y/N] ", "?".yellow().bold(), question);

    if let Err(e) = io::stdout().flush() {
        eprintln!("\nWarning: Failed to flush terminal: {}", e);
        return false;
    }

    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(_) => {
            let input = input.trim().to_lowercase();
            input == "y" || input == "yes"
        }
        Err(e) => {
            eprintln!("\nWarning: Failed to read input: {}", e);
            false
        }
    }
}

/// Column widths fitting `rows` into the terminal; the first column absorbs any shortfall.
pub fn column_widths(headers: &[&str], rows: &[Vec<String>], term_width: usize) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    let gaps = 2 * widths.len().saturating_sub(1);
    let total: usize = widths.iter().sum::<usize>() + gaps;
    if total > term_width
        && let Some(first) = widths.first_mut()
    {
        let excess = total - term_width;
        *first = first.saturating_sub(excess).max(8);
    }
    widths
}

fn fit(cell: &str, width: usize) -> String {
    let count = cell.chars().count();
    if count <= width {
        format!("{}{}", cell, " ".repeat(width - count))
    } else {
        let kept: String = cell.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

/// Print an aligned table sized to the terminal
pub fn table(headers: &[&str], rows: &[Vec<String>]) {
    let term_width = terminal_size().map(|(Width(w), _)| w as usize).unwrap_or(120);
    let widths = column_widths(headers, rows, term_width);

    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| fit(h, *w))
        .collect();
    println!("{}", header_line.join("  ").bold());
    println!("{}", "─".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)).bright_black());

    for row in rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| fit(cell, *w))
            .collect();
        println!("{}", line.join("  ").trim_end());
    }
}
