//! CLI presenter for output formatting

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::DB_FLOOR;

/// Width of the live amplitude meter in blocks.
const METER_WIDTH: usize = 24;

/// Quietest level the meter displays; anything below renders empty.
const METER_FLOOR_DB: f64 = -60.0;

/// Presenter for CLI output formatting
pub struct Presenter {
    meter: Option<ProgressBar>,
}

impl Presenter {
    pub fn new() -> Self {
        Self { meter: None }
    }

    /// Start the live recording line.
    pub fn start_meter(&mut self, message: &str) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.red} {msg}")
                .unwrap(),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        self.meter = Some(bar);
    }

    /// Update the live line with the current amplitude pair.
    pub fn update_meter(&self, current_db: f64, max_db: f64) {
        if let Some(ref bar) = self.meter {
            bar.set_message(Self::format_meter(current_db, max_db));
        }
    }

    /// Clear the live line.
    pub fn stop_meter(&mut self) {
        if let Some(bar) = self.meter.take() {
            bar.finish_and_clear();
        }
    }

    /// Render the amplitude pair as a bar plus numbers.
    pub fn format_meter(current_db: f64, max_db: f64) -> String {
        let filled = Self::meter_blocks(current_db);
        let current = if current_db <= DB_FLOOR {
            "silence".to_string()
        } else {
            format!("{current_db:6.1} dB")
        };
        format!(
            "[{}{}] {} (peak {:.1} dB)",
            "█".repeat(filled).cyan(),
            "░".repeat(METER_WIDTH - filled),
            current,
            max_db
        )
    }

    fn meter_blocks(db: f64) -> usize {
        let clamped = db.clamp(METER_FLOOR_DB, 0.0);
        let fraction = (clamped - METER_FLOOR_DB) / -METER_FLOOR_DB;
        (fraction * METER_WIDTH as f64).round() as usize
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout (the actual result output)
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a key-value pair (for the codecs listing)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{:>8}  {}", key.cyan(), value);
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}
