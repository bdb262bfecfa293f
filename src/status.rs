use std::time::Duration;

/// How long a rejection message stays up before the line reverts.
pub const FLASH_DURATION: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Flash {
    text: String,
    revert_to: String,
    until: Duration,
}

/// The message line under one timer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLine {
    text: String,
    flash: Option<Flash>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        match &self.flash {
            Some(flash) => &flash.text,
            None => &self.text,
        }
    }

    pub fn is_flashing(&self) -> bool {
        self.flash.is_some()
    }

    /// Replace the message. Cancels any pending flash.
    pub fn show(&mut self, text: impl Into<String>) {
        self.flash = None;
        self.text = text.into();
    }

    pub fn clear(&mut self) {
        self.show(String::new());
    }

    /// Show `text` until `now + FLASH_DURATION`, then revert silently.
    pub fn flash(&mut self, text: impl Into<String>, now: Duration) {
        let revert_to = match self.flash.take() {
            Some(previous) => previous.revert_to,
            None => self.text.clone(),
        };
        self.flash = Some(Flash {
            text: text.into(),
            revert_to,
            until: now + FLASH_DURATION,
        });
    }

    /// Drop an expired flash. Returns true when the visible text changed.
    pub fn expire(&mut self, now: Duration) -> bool {
        let expired = self.flash.as_ref().is_some_and(|f| now >= f.until);
        if !expired {
            return false;
        }
        if let Some(flash) = self.flash.take() {
            self.text = flash.revert_to;
        }
        true
    }
}
