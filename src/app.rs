use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::clock::Clock;
use crate::controller::Controller;
use crate::countdown::HmsField;
use crate::effects::{Alarm, Decider, Notifier};
use crate::registry::Tab;
use crate::runtime::AppEvent;

/// Terminal front end state: the controller plus quit tracking.
pub struct App<C: Clock, N: Notifier, A: Alarm> {
    pub controller: Controller<C, N, A>,
    pub should_quit: bool,
}

impl<C: Clock, N: Notifier, A: Alarm> App<C, N, A> {
    pub fn new(controller: Controller<C, N, A>) -> Self {
        Self {
            controller,
            should_quit: false,
        }
    }

    /// Apply one runner event. Returns true when the screen should be redrawn.
    pub fn on_event(&mut self, event: AppEvent, decider: &mut dyn Decider) -> bool {
        match event {
            AppEvent::Tick => {
                self.controller.pump();
                true
            }
            AppEvent::Reactivate => {
                self.controller.reactivate();
                true
            }
            AppEvent::Resize => true,
            AppEvent::Key(key) => {
                self.on_key(key, decider);
                true
            }
        }
    }

    pub fn on_key(&mut self, key: KeyEvent, decider: &mut dyn Decider) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        let c = &mut self.controller;
        // rejected requests are already flashed on the status line
        let _ = match (c.tab(), key.code) {
            (_, KeyCode::Char('q') | KeyCode::Esc) => {
                self.should_quit = true;
                Ok(())
            }
            (tab, KeyCode::Tab | KeyCode::BackTab) => c.switch_tab(tab.other()),

            (Tab::Focus, KeyCode::Char(' ')) => c.toggle_focus(decider),
            (Tab::Focus, KeyCode::Char('x')) => c.stop_focus(decider).map(|_| ()),
            (Tab::Focus, KeyCode::Char('r')) => {
                c.reset_focus();
                Ok(())
            }

            (Tab::Countdown, KeyCode::Char(' ')) => c.toggle_countdown(),
            (Tab::Countdown, KeyCode::Char('x')) => c.stop_countdown().map(|_| ()),
            (Tab::Countdown, KeyCode::Char('r')) => {
                c.reset_countdown();
                Ok(())
            }
            (Tab::Countdown, KeyCode::Char(ch @ '1'..='9')) => {
                c.apply_preset(ch as usize - '1' as usize)
            }
            (Tab::Countdown, KeyCode::Char(ch)) => match input_step(ch) {
                Some((field, delta)) => c.adjust_input(field, delta),
                None => Ok(()),
            },
            _ => Ok(()),
        };
    }
}

fn input_step(ch: char) -> Option<(HmsField, i64)> {
    let field = match ch.to_ascii_lowercase() {
        'h' => HmsField::Hours,
        'm' => HmsField::Minutes,
        's' => HmsField::Seconds,
        _ => return None,
    };
    let delta = if ch.is_ascii_uppercase() { -1 } else { 1 };
    Some((field, delta))
}
