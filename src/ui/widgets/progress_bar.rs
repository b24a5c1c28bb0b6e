use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::models::size::{format_number, human_readable_size};

/// Two-line live summary shown above the category table.
pub struct ScanProgressBar {
    pub scanning: bool,
    pub files_scanned: u64,
    pub dirs_scanned: u64,
    pub unwanted_files: u64,
    pub unwanted_size: u64,
    pub speed: f64,
    pub root_path: String,
}

impl Widget for ScanProgressBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 20 {
            return;
        }

        // Line 1: scan stats
        let mut spans = Vec::new();
        if self.scanning {
            spans.push(Span::styled("Scanning... ", Style::default().fg(Color::Yellow)));
        }
        spans.push(Span::styled(
            format!(
                "Files scanned: {} | Directories scanned: {} | Unwanted files found: {} ({})",
                format_number(self.files_scanned),
                format_number(self.dirs_scanned),
                format_number(self.unwanted_files),
                human_readable_size(self.unwanted_size),
            ),
            Style::default().fg(Color::White),
        ));
        if self.scanning && self.speed > 0.0 {
            spans.push(Span::styled(
                format!(" | {:.0} files/s", self.speed),
                Style::default().fg(Color::DarkGray),
            ));
        }
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);

        // Line 2: root path
        if area.height >= 2 {
            let path_display = truncate_path(&self.root_path, (area.width as usize).saturating_sub(8));
            let path_line = Line::from(vec![
                Span::styled("Root: ", Style::default().fg(Color::DarkGray)),
                Span::styled(path_display, Style::default().fg(Color::DarkGray)),
            ]);
            buf.set_line(area.x, area.y + 1, &path_line, area.width);
        }
    }
}

fn truncate_path(path: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthStr;
    if path.width() <= max_width {
        return path.to_string();
    }
    if max_width < 6 {
        return "...".to_string();
    }
    // Show start and end of path
    let keep = max_width - 3;
    let tail_len = keep / 2;
    let head_len = keep - tail_len;

    let mut w = 0;
    let head_end = path
        .char_indices()
        .find(|&(_, c)| {
            w += unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
            w > head_len
        })
        .map(|(i, _)| i)
        .unwrap_or(path.len());

    w = 0;
    let tail_start = path
        .char_indices()
        .rev()
        .find(|&(_, c)| {
            w += unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
            w > tail_len
        })
        .map(|(i, _)| i + path[i..].chars().next().map(|c| c.len_utf8()).unwrap_or(0))
        .unwrap_or(0);

    format!("{}...{}", &path[..head_end], &path[tail_start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_paths_keep_both_ends() {
        let out = truncate_path("/media/library/tv/Some Show/Season 01", 20);
        assert!(out.starts_with("/media/"));
        assert!(out.ends_with("n 01"));
        assert!(out.contains("..."));
        assert_eq!(truncate_path("/tv", 20), "/tv");
    }
}
