//! Peripheral collaborators: confirmations, notifications and alarms.
//!
//! The timers only ever call these through traits. Notification and alarm
//! failures are reported back as `EffectError` so the caller can log them,
//! but they never stop a timer.

use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EffectError {
    #[error("notification failed: {0}")]
    Notification(String),
    #[error("alarm playback failed: {0}")]
    Playback(#[from] io::Error),
}

/// Synchronous yes/no decision. Nothing else happens until it returns.
pub trait Decider {
    fn confirm(&mut self, question: &str) -> bool;
}

/// Always answers the same way and remembers what it was asked.
#[derive(Debug, Clone, Default)]
pub struct FixedDecider {
    answer: bool,
    pub asked: Vec<String>,
}

impl FixedDecider {
    pub fn yes() -> Self {
        Self {
            answer: true,
            asked: Vec::new(),
        }
    }

    pub fn no() -> Self {
        Self {
            answer: false,
            asked: Vec::new(),
        }
    }
}

impl Decider for FixedDecider {
    fn confirm(&mut self, question: &str) -> bool {
        self.asked.push(question.to_string());
        self.answer
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

pub trait Notifier {
    fn notify(&mut self, notice: &Notice) -> Result<(), EffectError>;
}

/// Desktop notifications via the platform notification service. Delivery
/// happens on a short-lived thread; its failures are only logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&mut self, notice: &Notice) -> Result<(), EffectError> {
        let notice = notice.clone();
        std::thread::Builder::new()
            .name("notify".to_string())
            .spawn(move || {
                let shown = notify_rust::Notification::new()
                    .summary(&notice.title)
                    .body(&notice.body)
                    .appname("fokus")
                    .icon("alarm-clock")
                    .timeout(notify_rust::Timeout::Milliseconds(5_000))
                    .show();
                if let Err(e) = shown {
                    tracing::debug!(error = %e, title = %notice.title, "desktop notification failed");
                }
            })
            .map(|_| ())
            .map_err(|e| EffectError::Notification(e.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    pub sent: Vec<Notice>,
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, notice: &Notice) -> Result<(), EffectError> {
        self.sent.push(notice.clone());
        Ok(())
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AlarmTone {
    #[default]
    Standard,
    High,
}

pub trait Alarm {
    fn play(&mut self, tone: AlarmTone) -> Result<(), EffectError>;
}

/// Plays a sound file through the first available player, or rings the
/// terminal bell when no sound file is installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandAlarm;

impl CommandAlarm {
    fn candidates(tone: AlarmTone) -> &'static [(&'static str, &'static str)] {
        match tone {
            AlarmTone::Standard => &[
                ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
                ("afplay", "/System/Library/Sounds/Glass.aiff"),
                ("aplay", "/usr/share/sounds/generic.wav"),
            ],
            AlarmTone::High => &[
                ("paplay", "/usr/share/sounds/freedesktop/stereo/alarm-clock-elapsed.oga"),
                ("afplay", "/System/Library/Sounds/Sosumi.aiff"),
                ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
            ],
        }
    }
}

impl Alarm for CommandAlarm {
    fn play(&mut self, tone: AlarmTone) -> Result<(), EffectError> {
        for (player, file) in Self::candidates(tone) {
            if Path::new(file).exists() {
                Command::new(player)
                    .arg(file)
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()?;
                return Ok(());
            }
        }

        let mut stdout = io::stdout();
        stdout.write_all(b"\x07")?;
        stdout.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingAlarm {
    pub played: Vec<AlarmTone>,
}

impl Alarm for RecordingAlarm {
    fn play(&mut self, tone: AlarmTone) -> Result<(), EffectError> {
        self.played.push(tone);
        Ok(())
    }
}
