use crate::utils::logger::{LogLevel, Logger};
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::Cell;
use std::time::Duration;

pub struct Spinner {
    bar: ProgressBar,
    active: Cell<bool>,
}

impl Spinner {
    pub fn new(message: impl Into<String>) -> Self {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        bar.set_style(style);
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(80));

        Spinner {
            bar,
            active: Cell::new(true),
        }
    }

    pub fn succeed(&self, message: impl Into<String>) {
        if self.active.get() {
            self.bar.finish_and_clear();
            Logger::new().log_message(LogLevel::Success, &message.into());
            self.active.set(false);
        }
    }

    /// Clears the spinner without printing; the caller reports the error.
    pub fn clear(&self) {
        if self.active.get() {
            self.bar.finish_and_clear();
            self.active.set(false);
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if self.active.get() {
            self.bar.abandon();
            self.active.set(false);
        }
    }
}

pub fn run_step<T, E, F, S>(start_message: &str, on_success: S, action: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
    S: FnOnce(&T) -> String,
{
    let spinner = Spinner::new(start_message);
    match action() {
        Ok(value) => {
            let message = on_success(&value);
            spinner.succeed(message);
            Ok(value)
        }
        Err(err) => {
            spinner.clear();
            Err(err)
        }
    }
}

pub fn run_unit_step<E, F>(start_message: &str, success_message: &str, action: F) -> Result<(), E>
where
    F: FnOnce() -> Result<(), E>,
{
    run_step(start_message, |_| success_message.to_string(), action)
}

/// Like `run_unit_step`, but the spinner is cleared before `action` runs so a
/// subprocess can write to the terminal undisturbed.
pub fn run_foreground_step<E, F>(start_message: &str, success_message: &str, action: F) -> Result<(), E>
where
    F: FnOnce() -> Result<(), E>,
{
    let logger = Logger::new();
    logger.log_message(LogLevel::Info, start_message);
    action()?;
    logger.log_message(LogLevel::Success, success_message);
    Ok(())
}
