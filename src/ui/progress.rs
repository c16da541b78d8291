use colored::Colorize;
use std::io::{self, Write};
use std::time::Instant;
use terminal_size::{Width, terminal_size};

const MAX_BAR_WIDTH: usize = 40;
/// Columns kept free for the message, percentage and elapsed time
const RESERVED_COLUMNS: usize = 40;

/// Single-line percentage bar for a running operation
pub struct ProgressBar {
    total: usize,
    current: usize,
    message: String,
    start_time: Instant,
    width: usize,
    finished: bool,
}

impl ProgressBar {
    /// Create a new progress bar
    pub fn new(total: usize, message: &str) -> Self {
        let term_width = terminal_size().map(|(Width(w), _)| w as usize).unwrap_or(80);
        Self {
            total,
            current: 0,
            message: message.to_string(),
            start_time: Instant::now(),
            width: term_width.saturating_sub(RESERVED_COLUMNS).clamp(10, MAX_BAR_WIDTH),
            finished: false,
        }
    }

    /// Bar over 0..=100
    pub fn percent(message: &str) -> Self {
        Self::new(100, message)
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Set the current progress; it never moves backwards
    pub fn set(&mut self, value: usize) {
        let value = value.min(self.total);
        if value > self.current {
            self.current = value;
            self.draw();
        }
    }

    /// Move to 100% and end the line
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.current = self.total;
        self.draw();
        println!();
    }

    /// End the line without completing the bar
    pub fn abandon(&mut self) {
        if !self.finished {
            self.finished = true;
            println!();
        }
    }

    fn filled(&self) -> usize {
        if self.total > 0 {
            (self.current * self.width) / self.total
        } else {
            self.width
        }
    }

    fn draw(&self) {
        let percent = if self.total > 0 {
            (self.current * 100) / self.total
        } else {
            100
        };
        let filled = self.filled();
        let bar = "█".repeat(filled);
        let empty = "░".repeat(self.width.saturating_sub(filled));

        print!(
            "\r{} {} {} {}% {}",
            "▸".dimmed(),
            self.message.cyan(),
            format!("[{}{}]", bar.green(), empty.dimmed()),
            percent.to_string().bold(),
            format!("{}s", self.start_time.elapsed().as_secs()).dimmed()
        );
        io::stdout().flush().unwrap_or(());
    }
}

impl Drop for ProgressBar {
    fn drop(&mut self) {
        self.abandon();
    }
}

#[cfg(test)]
mod tests;
