use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "While scanning or deleting",
        &[("Esc / c", "Cancel the running operation")],
    ),
    (
        "Results",
        &[
            ("j / Down", "Move down"),
            ("k / Up", "Move up"),
            ("d", "Delete unwanted files (asks first)"),
            ("r", "Scan again"),
            ("x", "Export results as JSON"),
        ],
    ),
    (
        "Anywhere",
        &[("?", "Toggle this help"), ("q / Ctrl+C", "Quit")],
    ),
];

pub struct HelpPanel;

impl Widget for HelpPanel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let heading = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);

        let mut lines = vec![Line::from("")];
        for (title, bindings) in SECTIONS {
            lines.push(Line::from(Span::styled(format!("  {}", title), heading)));
            lines.extend(bindings.iter().map(|(key, desc)| {
                Line::from(vec![
                    Span::styled(format!("    {:<12}", key), Style::default().fg(Color::Green)),
                    Span::raw(*desc),
                ])
            }));
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            "  Press ? or Esc to close",
            Style::default().fg(Color::DarkGray),
        )));

        Paragraph::new(lines)
            .block(
                Block::default()
                    .title(" mediasweep - Keyboard Shortcuts ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .style(Style::default().bg(Color::Black))
            .render(area, buf);
    }
}
