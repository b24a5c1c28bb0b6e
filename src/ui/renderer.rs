use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap};
use ratatui::Frame;

use crate::models::size::human_readable_size;
use crate::ui::app_state::{AppState, ViewMode};
use crate::ui::widgets::category_table::{CategoryTable, CategoryTableState};
use crate::ui::widgets::help_panel::HelpPanel;
use crate::ui::widgets::progress_bar::ScanProgressBar;
use crate::ui::widgets::status_bar::StatusBar;

pub fn render(frame: &mut Frame, state: &AppState) {
    render_main(frame, state);
    match state.view_mode {
        ViewMode::Help => frame.render_widget(HelpPanel, centered_rect(60, 60, frame.area())),
        ViewMode::Confirm => render_confirm_overlay(frame, state),
        _ => {}
    }
}

fn render_main(frame: &mut Frame, state: &AppState) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Length(2), // live stats
            Constraint::Min(5),    // category table
            Constraint::Length(1), // deletion gauge
            Constraint::Length(1), // status bar
            Constraint::Length(1), // key hints
        ])
        .split(area);

    let title = Paragraph::new(Line::from(vec![
        Span::styled(" mediasweep ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::styled(
            format!(" - {} ", state.root_path.display()),
            Style::default().fg(Color::White),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
    frame.render_widget(title, chunks[0]);

    let summary = ScanProgressBar {
        scanning: state.view_mode == ViewMode::Scanning,
        files_scanned: state.stats.files_scanned,
        dirs_scanned: state.stats.dirs_scanned,
        unwanted_files: state.stats.unwanted_file_count,
        unwanted_size: state.stats.unwanted_total_size,
        speed: state.scan_speed,
        root_path: state.root_path.display().to_string(),
    };
    frame.render_widget(summary, chunks[1]);

    let table = CategoryTable::new(&state.rows).block(
        Block::default()
            .title(" Unwanted files ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    let mut table_state = CategoryTableState {
        selected: state.selected_index,
        offset: state.list_offset,
    };
    frame.render_stateful_widget(table, chunks[2], &mut table_state);

    if state.delete_total > 0 {
        let ratio = (state.delete_processed as f64 / state.delete_total as f64).clamp(0.0, 1.0);
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
            .ratio(ratio)
            .label(format!("{} / {}", state.delete_processed, state.delete_total));
        frame.render_widget(gauge, chunks[3]);
    }

    let skipped = state.last_report.as_ref().map(|r| r.errors.len()).unwrap_or(0);
    let status = StatusBar {
        message: &state.status,
        kind: state.status_kind,
        skipped_entries: skipped,
    };
    frame.render_widget(status, chunks[4]);

    frame.render_widget(key_hints(state), chunks[5]);
}

fn key_hints(state: &AppState) -> Paragraph<'static> {
    let pairs: &[(&str, &str)] = match state.view_mode {
        ViewMode::Scanning | ViewMode::Deleting => &[(" Esc", ": Cancel  "), ("q", ": Quit")],
        _ if state.can_delete() => &[
            (" d", ": Delete  "),
            ("r", ": Rescan  "),
            ("x", ": Export  "),
            ("?", ": Help  "),
            ("q", ": Quit"),
        ],
        _ => &[(" r", ": Rescan  "), ("x", ": Export  "), ("?", ": Help  "), ("q", ": Quit")],
    };

    let spans: Vec<Span> = pairs
        .iter()
        .flat_map(|(key, desc)| {
            [
                Span::styled(*key, Style::default().fg(Color::Yellow)),
                Span::styled(*desc, Style::default().fg(Color::DarkGray)),
            ]
        })
        .collect();
    Paragraph::new(Line::from(spans))
}

fn render_confirm_overlay(frame: &mut Frame, state: &AppState) {
    let area = centered_rect(50, 30, frame.area());
    frame.render_widget(Clear, area);

    let (count, size) = state
        .last_report
        .as_ref()
        .map(|r| (r.statistics.unwanted_file_count, r.statistics.unwanted_total_size))
        .unwrap_or((0, 0));

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "  Are you sure you want to delete {} files ({})?",
                count,
                human_readable_size(size)
            ),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "  Files are removed permanently, not moved to the trash.",
            Style::default().fg(Color::Red),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y / Enter", Style::default().fg(Color::Green)),
            Span::raw(": delete   "),
            Span::styled("n / Esc", Style::default().fg(Color::Yellow)),
            Span::raw(": keep"),
        ]),
    ];

    let dialog = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Confirm Deletion ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .style(Style::default().bg(Color::Black))
        .wrap(Wrap { trim: false });
    frame.render_widget(dialog, area);
}

/// Helper to create a centered rectangle within a given area
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
