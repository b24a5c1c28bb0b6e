use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, StatefulWidget, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::core::analyzer::CategoryRow;
use crate::models::size::{format_number, human_readable_size};

pub struct CategoryTableState {
    pub selected: usize,
    pub offset: usize,
}

/// File Type / Count / Total Size table, total row in bold.
pub struct CategoryTable<'a> {
    rows: &'a [CategoryRow],
    block: Option<Block<'a>>,
}

const COUNT_WIDTH: usize = 10;
const SIZE_WIDTH: usize = 12;

impl<'a> CategoryTable<'a> {
    pub fn new(rows: &'a [CategoryRow]) -> Self {
        Self { rows, block: None }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl StatefulWidget for CategoryTable<'_> {
    type State = CategoryTableState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let inner = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner.height < 2 || inner.width < 30 {
            return;
        }

        let label_width = (inner.width as usize).saturating_sub(COUNT_WIDTH + SIZE_WIDTH + 2);
        let header = format!(
            " {:<lw$}{:>cw$}{:>sw$}",
            "File Type",
            "Count",
            "Total Size",
            lw = label_width,
            cw = COUNT_WIDTH,
            sw = SIZE_WIDTH
        );
        let header = Line::from(Span::styled(header, Style::default().fg(Color::DarkGray)));
        buf.set_line(inner.x, inner.y, &header, inner.width);

        let list_height = (inner.height as usize).saturating_sub(1);
        if self.rows.is_empty() {
            let empty = Line::from(Span::styled(
                " Nothing found yet",
                Style::default().fg(Color::DarkGray),
            ));
            buf.set_line(inner.x, inner.y + 1, &empty, inner.width);
            return;
        }

        // Keep the selection visible
        if state.selected < state.offset {
            state.offset = state.selected;
        }
        if state.selected >= state.offset + list_height {
            state.offset = state.selected + 1 - list_height;
        }

        let end = (state.offset + list_height).min(self.rows.len());
        for (i, row) in self.rows[state.offset..end].iter().enumerate() {
            let row_y = inner.y + 1 + i as u16;
            let is_selected = state.offset + i == state.selected;

            let label = truncate(&row.label, label_width.saturating_sub(1));
            let pad = label_width.saturating_sub(label.width() + 1);
            let text = format!(
                " {}{:pad$} {:>cw$}{:>sw$}",
                label,
                "",
                format_number(row.count),
                human_readable_size(row.size),
                pad = pad,
                cw = COUNT_WIDTH - 1,
                sw = SIZE_WIDTH
            );

            let style = if row.is_total {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else if is_selected {
                Style::default()
                    .bg(Color::DarkGray)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            buf.set_line(inner.x, row_y, &Line::from(Span::styled(text, style)), inner.width);
        }
    }
}

fn truncate(label: &str, max_width: usize) -> String {
    if label.width() <= max_width {
        return label.to_string();
    }
    let target = max_width.saturating_sub(3);
    let mut w = 0;
    let boundary = label
        .char_indices()
        .find(|&(_, c)| {
            w += unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
            w > target
        })
        .map(|(i, _)| i)
        .unwrap_or(label.len());
    format!("{}...", &label[..boundary])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_labels_are_truncated_to_width() {
        let out = truncate("Numbered files (.001, .002, etc.)", 12);
        assert_eq!(out, "Numbered ...");
        assert_eq!(truncate(".rar", 12), ".rar");
    }

    #[test]
    fn renders_rows_into_buffer() {
        let rows = vec![CategoryRow {
            label: ".rar".to_string(),
            count: 2,
            size: 2048,
            percentage: 100.0,
            is_total: false,
        }];
        let area = Rect::new(0, 0, 40, 3);
        let mut buf = Buffer::empty(area);
        let mut state = CategoryTableState {
            selected: 0,
            offset: 0,
        };
        CategoryTable::new(&rows).render(area, &mut buf, &mut state);

        let line: String = (0..area.width)
            .map(|x| buf[(x, 1)].symbol().to_string())
            .collect();
        assert!(line.contains(".rar"));
        assert!(line.contains("2.00 KB"));
    }
}
