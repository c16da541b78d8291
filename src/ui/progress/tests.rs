use super::*;

#[test]
fn test_progress_bar_creation() {
    let bar = ProgressBar::percent("Installing Git.Git");
    assert_eq!(bar.total, 100);
    assert_eq!(bar.current(), 0);
    assert!((10..=MAX_BAR_WIDTH).contains(&bar.width));
}

#[test]
fn test_progress_bar_set() {
    let mut bar = ProgressBar::new(100, "Testing");
    bar.set(50);
    assert_eq!(bar.current(), 50);
    bar.set(150); // Should cap at total
    assert_eq!(bar.current(), 100);
}

#[test]
fn test_progress_never_goes_back() {
    let mut bar = ProgressBar::percent("Testing");
    bar.set(70);
    bar.set(20);
    assert_eq!(bar.current(), 70);
}

#[test]
fn test_finish_is_idempotent() {
    let mut bar = ProgressBar::percent("Testing");
    bar.finish();
    bar.finish();
    assert_eq!(bar.current(), 100);
    assert!(bar.finished);
}
