use crossterm::event::KeyCode;
use ratatui::{backend::Backend, Terminal};

use crate::effects::Decider;
use crate::runtime::{AppEventSource, Runner, Ticker};
use crate::ui::PromptView;

/// Asks on the terminal and blocks until a key is pressed. Only `y` counts
/// as yes.
pub struct TerminalDecider<'a, B: Backend, E: AppEventSource, T: Ticker> {
    terminal: &'a mut Terminal<B>,
    runner: &'a Runner<E, T>,
}

impl<'a, B: Backend, E: AppEventSource, T: Ticker> TerminalDecider<'a, B, E, T> {
    pub fn new(terminal: &'a mut Terminal<B>, runner: &'a Runner<E, T>) -> Self {
        Self { terminal, runner }
    }
}

impl<B: Backend, E: AppEventSource, T: Ticker> Decider for TerminalDecider<'_, B, E, T> {
    fn confirm(&mut self, question: &str) -> bool {
        let drawn = self
            .terminal
            .draw(|f| f.render_widget(PromptView { question }, f.area()));
        if let Err(e) = drawn {
            tracing::warn!(error = %e, "could not draw prompt");
        }

        let answer = matches!(
            self.runner.next_key().map(|key| key.code),
            Some(KeyCode::Char('y' | 'Y'))
        );
        tracing::info!(question, answer, "prompt answered");
        answer
    }
}
