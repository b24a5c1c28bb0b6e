use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::ui::app_state::StatusKind;

pub struct StatusBar<'a> {
    pub message: &'a str,
    pub kind: StatusKind,
    pub skipped_entries: usize,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 10 {
            return;
        }

        let color = match self.kind {
            StatusKind::Info => Color::White,
            StatusKind::Success => Color::Green,
            StatusKind::Warning => Color::Yellow,
            StatusKind::Error => Color::Red,
        };

        let mut spans = vec![Span::styled(
            format!(" {}", self.message),
            Style::default().fg(color),
        )];

        if self.skipped_entries > 0 {
            let note = format!("{} unreadable entries skipped ", self.skipped_entries);
            let left_len: usize = spans.iter().map(|s| s.content.len()).sum();
            let padding = (area.width as usize).saturating_sub(left_len + note.len());
            spans.push(Span::raw(format!("{:pad$}", "", pad = padding)));
            spans.push(Span::styled(note, Style::default().fg(Color::Red)));
        }

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
