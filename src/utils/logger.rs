#[cfg(feature = "cli")]
use crossterm::style::{Attribute, Color, ResetColor, SetAttribute, SetForegroundColor};
#[cfg(feature = "cli")]
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, Ordering};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Enables `Debug` level output for the rest of the process.
pub fn set_verbose(enabled: bool) {
    VERBOSE.store(enabled, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogLevel {
    Success,
    Error,
    Info,
    Warning,
    Debug,
}

#[derive(Debug, Clone, Default)]
pub struct Logger;

impl Logger {
    pub fn new() -> Self {
        Logger
    }

    pub fn log_message(&self, level: LogLevel, message: &str) {
        if level == LogLevel::Debug && !is_verbose() {
            return;
        }
        let line = format!(
            "{} {} {}",
            self.tool_signature(),
            self.format_status(level),
            message
        );
        if level == LogLevel::Error {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    pub fn log_message_with_trace(&self, level: LogLevel, message: &str, trace: Vec<&str>) {
        self.log_message(level, message);
        for t in trace {
            println!("     ↳ {}", t);
        }
    }

    #[cfg(feature = "cli")]
    fn tool_signature(&self) -> String {
        let mut s = String::new();

        let _ = write!(&mut s, "{}", SetForegroundColor(Color::Grey));
        s.push('[');
        let _ = write!(
            &mut s,
            "{}",
            SetForegroundColor(Color::Rgb {
                r: 242,
                g: 153,
                b: 0,
            })
        );
        let _ = write!(&mut s, "{}", SetAttribute(Attribute::Bold));
        s.push_str("bkpack");
        let _ = write!(&mut s, "{}", SetAttribute(Attribute::Reset));
        let _ = write!(&mut s, "{}", SetForegroundColor(Color::Grey));
        s.push(']');
        let _ = write!(&mut s, "{}", ResetColor);

        s
    }

    #[cfg(not(feature = "cli"))]
    fn tool_signature(&self) -> String {
        "[bkpack]".to_string()
    }

    #[cfg(feature = "cli")]
    fn format_status(&self, level: LogLevel) -> String {
        let mut s = String::new();

        let color = match level {
            LogLevel::Success => Color::Rgb {
                r: 76,
                g: 175,
                b: 80,
            },
            LogLevel::Error => Color::Rgb {
                r: 244,
                g: 67,
                b: 54,
            },
            LogLevel::Info => Color::Rgb {
                r: 33,
                g: 150,
                b: 243,
            },
            LogLevel::Warning => Color::Rgb {
                r: 255,
                g: 152,
                b: 0,
            },
            LogLevel::Debug => Color::Rgb {
                r: 103,
                g: 58,
                b: 183,
            },
        };

        s.push('[');
        let _ = write!(&mut s, "{}", SetForegroundColor(color));
        let _ = write!(&mut s, "{}", SetAttribute(Attribute::Bold));
        s.push_str(status_label(level));
        let _ = write!(&mut s, "{}", SetAttribute(Attribute::Reset));
        s.push(']');
        let _ = write!(&mut s, "{}", ResetColor);

        s
    }

    #[cfg(not(feature = "cli"))]
    fn format_status(&self, level: LogLevel) -> String {
        format!("[{}]", status_label(level))
    }
}

fn status_label(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Success => "SUCCESS",
        LogLevel::Error => "ERROR",
        LogLevel::Info => "INFO",
        LogLevel::Warning => "WARNING",
        LogLevel::Debug => "DEBUG",
    }
}
