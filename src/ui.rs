use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::app::App;
use crate::clock::Clock;
use crate::effects::{Alarm, Notifier};
use crate::readout::{ClockReadout, StopwatchReadout};
use crate::registry::Tab;
use crate::timer::Phase;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const RECENT_SESSIONS: usize = 5;

impl<C: Clock, N: Notifier, A: Alarm> Widget for &App<C, N, A> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let c = &self.controller;

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let active_tab_style = Style::default()
            .patch(bold_style)
            .fg(Color::Black)
            .bg(Color::Cyan);
        let locked_style = Style::default().fg(Color::Red);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // tabs
                Constraint::Min(1),    // padding
                Constraint::Length(1), // readout
                Constraint::Length(1), // status
                Constraint::Length(2), // countdown inputs / rest
                Constraint::Min(1),    // padding
                Constraint::Length(RECENT_SESSIONS as u16 + 1),
                Constraint::Length(1), // help
            ])
            .split(area);

        // tabs
        let mut tabs = Vec::new();
        for tab in [Tab::Focus, Tab::Countdown] {
            let style = if tab == c.tab() {
                active_tab_style
            } else {
                dim_style
            };
            tabs.push(Span::styled(format!(" {tab} "), style));
            tabs.push(Span::raw(" "));
        }
        if c.registry().any_active() {
            tabs.push(Span::styled("locked", locked_style));
        }
        Paragraph::new(Line::from(tabs)).render(chunks[0], buf);

        // readout
        let (readout, phase) = match c.tab() {
            Tab::Focus => (
                StopwatchReadout::from(c.focus().elapsed()).to_string(),
                c.focus().phase(),
            ),
            Tab::Countdown => (
                ClockReadout::from(c.countdown().remaining()).to_string(),
                c.countdown().phase(),
            ),
        };
        let readout_style = match phase {
            Phase::Running => Style::default().patch(bold_style).fg(Color::Green),
            Phase::Paused => Style::default().patch(bold_style).fg(Color::Yellow),
            _ => bold_style,
        };
        Paragraph::new(Span::styled(readout, readout_style))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        // status
        let status = c.status(c.tab().kind());
        let status_style = if status.is_flashing() {
            locked_style.add_modifier(Modifier::ITALIC)
        } else {
            Style::default().add_modifier(Modifier::ITALIC)
        };
        Paragraph::new(Span::styled(status.text().to_string(), status_style))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[3], buf);

        // inputs or rest
        let detail = match c.tab() {
            Tab::Countdown => {
                let inputs = c.inputs();
                let input_style = if c.registry().any_active() {
                    dim_style
                } else {
                    bold_style
                };
                let presets = c
                    .config()
                    .presets
                    .iter()
                    .take(9)
                    .enumerate()
                    .map(|(i, secs)| format!("{}:{}", i + 1, ClockReadout::from_secs(*secs)))
                    .collect::<Vec<_>>()
                    .join("  ");
                vec![
                    Line::from(Span::styled(
                        format!(
                            "{}h {:02}m {:02}s",
                            inputs.hours, inputs.minutes, inputs.seconds
                        ),
                        input_style,
                    )),
                    Line::from(Span::styled(presets, dim_style)),
                ]
            }
            Tab::Focus => match c.rest_remaining() {
                Some(secs) => vec![Line::from(Span::styled(
                    format!("rest {}", ClockReadout::from_secs(secs)),
                    Style::default().fg(Color::Magenta),
                ))],
                None => Vec::new(),
            },
        };
        Paragraph::new(detail)
            .alignment(Alignment::Center)
            .render(chunks[4], buf);

        // session log
        let sessions = c.sessions();
        let mut lines = vec![Line::from(Span::styled(
            format!(
                "sessions: {}  total: {}",
                sessions.len(),
                ClockReadout::from_secs(sessions.total())
            ),
            bold_style,
        ))];
        lines.extend(sessions.records().iter().rev().take(RECENT_SESSIONS).map(|r| {
            Line::from(Span::styled(
                format!("#{:<4} {}", r.session, ClockReadout::from_secs(r.duration)),
                dim_style,
            ))
        }));
        Paragraph::new(lines).render(chunks[6], buf);

        // help
        let help = match c.tab() {
            Tab::Focus => "(space) start/pause  (x) stop  (r) reset  (tab) countdown  (q) quit",
            Tab::Countdown => {
                "(space) start/pause  (x) stop  (r) reset  (1-9) preset  (h/m/s H/M/S) adjust  (tab) focus  (q) quit"
            }
        };
        Paragraph::new(Span::styled(help, dim_style))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[7], buf);
    }
}

/// Modal yes/no question
pub struct PromptView<'a> {
    pub question: &'a str,
}

impl Widget for PromptView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = (self.question.len() as u16 + 6).max(34).min(area.width);
        let height = 4.min(area.height);
        let popup = Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        );

        Clear.render(popup, buf);
        Paragraph::new(vec![
            Line::from(self.question),
            Line::from(Span::styled(
                "(y) yes  (any other key) no",
                Style::default().add_modifier(Modifier::DIM),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .render(popup, buf);
    }
}
