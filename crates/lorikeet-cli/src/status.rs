//! User-facing status line.
//!
//! Mirrors what the character is being told to do.  The line is only
//! reprinted when the status actually changes, so a held gesture does not
//! flood the terminal.

use colored::{ColoredString, Colorize};
use lorikeet_types::GestureSymbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Provider running, no gesture seen yet.
    Waiting,
    Gesture(GestureSymbol),
    ProviderFailed,
}

impl Status {
    pub fn message(self) -> &'static str {
        match self {
            Status::Waiting => "Move your hand in front of the camera",
            Status::Gesture(GestureSymbol::Open) => "Flying! (open hand)",
            Status::Gesture(GestureSymbol::Closed) => "Landing... (closed hand)",
            Status::Gesture(GestureSymbol::Peace) => "Love for Niriel! (peace sign)",
            Status::ProviderFailed => "Could not access the landmark source",
        }
    }

    fn styled(self) -> ColoredString {
        let text = self.message();
        match self {
            Status::Waiting => text.dimmed(),
            Status::Gesture(GestureSymbol::Open) => text.green().bold(),
            Status::Gesture(GestureSymbol::Closed) => text.yellow().bold(),
            Status::Gesture(GestureSymbol::Peace) => text.magenta().bold(),
            Status::ProviderFailed => text.red().bold(),
        }
    }
}

/// Tracks the last shown status.
#[derive(Debug, Default)]
pub struct StatusPresenter {
    current: Option<Status>,
}

impl StatusPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Status> {
        self.current
    }

    /// Record `status`; returns the line to print if it differs from the
    /// last one shown.
    pub fn update(&mut self, status: Status) -> Option<String> {
        if self.current == Some(status) {
            return None;
        }
        self.current = Some(status);
        Some(format!("  {} {}", "●".bold(), status.styled()))
    }
}
