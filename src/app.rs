use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::Event as TermEvent;
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::config::settings::Settings;
use crate::core::events::{self, Event, EventReceiver};
use crate::core::session::Session;
use crate::ui::app_state::{AppState, StatusKind, ViewMode};
use crate::ui::input::{self, InputAction};
use crate::ui::renderer;

pub struct App {
    state: AppState,
    session: Session,
    event_rx: EventReceiver,
}

impl App {
    pub fn new(root_path: PathBuf, settings: Settings) -> Self {
        let (event_tx, event_rx) = events::create_event_channel();
        Self {
            state: AppState::new(root_path),
            session: Session::new(settings, event_tx),
            event_rx,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        // Initialize terminal
        terminal::enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        self.start_scan();
        let result = self.event_loop(&mut terminal).await;

        // Whatever is still running must not outlive the UI.
        self.session.request_cancel();

        // Restore terminal
        terminal::disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn start_scan(&mut self) {
        // Completion arrives as an event; the handle is not needed.
        drop(self.session.start_scan(self.state.root_path.clone()));
        self.state.begin_scan(self.session.generation());
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    ) -> anyhow::Result<()> {
        // Dedicated blocking thread for terminal input.
        let (input_tx, mut input_rx) = mpsc::unbounded_channel::<TermEvent>();
        let _input_thread = tokio::task::spawn_blocking(move || loop {
            match input::poll_event(Duration::from_millis(50)) {
                Ok(Some(event)) => {
                    if input_tx.send(event).is_err() {
                        break;
                    }
                }
                Ok(None) if input_tx.is_closed() => break,
                Ok(None) => {}
                Err(_) => break,
            }
        });

        let mut tick_interval = tokio::time::interval(Duration::from_millis(100));

        loop {
            terminal.draw(|frame| {
                renderer::render(frame, &self.state);
            })?;

            tokio::select! {
                input_event = input_rx.recv() => {
                    match input_event {
                        Some(TermEvent::Key(key)) => {
                            let action = input::handle_key_event(key, &mut self.state);
                            self.handle_action(action);
                        }
                        Some(_) => {}
                        None => return Ok(()),
                    }
                }
                Some(event) = self.event_rx.recv() => {
                    self.handle_session_event(event);
                }
                _ = tick_interval.tick() => {
                    if self.state.view_mode == ViewMode::Scanning {
                        self.state.scan_speed = self.session.files_per_second();
                    }
                }
            }

            if self.state.should_quit {
                return Ok(());
            }
        }
    }

    fn handle_action(&mut self, action: InputAction) {
        match action {
            InputAction::Quit | InputAction::None => {}
            InputAction::Cancel => self.session.request_cancel(),
            InputAction::Rescan => self.start_scan(),
            InputAction::Export => self.handle_export(),
            InputAction::ConfirmDelete => match self.session.start_delete() {
                Ok(handle) => {
                    drop(handle);
                    let total = self.state.last_report.as_ref().map(|r| r.candidates.len()).unwrap_or(0);
                    self.state.begin_delete(total);
                }
                Err(e) => {
                    self.state.dismiss_confirm();
                    self.state.set_status(StatusKind::Error, e.to_string());
                }
            },
        }
    }

    fn handle_session_event(&mut self, event: Event) {
        // Late events of a replaced generation are dropped.
        if event.generation() != self.state.generation {
            return;
        }
        match event {
            Event::ScanStarted { .. } | Event::DeleteStarted { .. } => {}
            Event::ScanProgress { stats, .. } => self.state.update_stats(stats),
            Event::ScanCompleted { report, .. } => self.state.finish_scan(report),
            Event::DeleteProgress { processed, total, .. } => {
                self.state.update_delete(processed, total)
            }
            Event::DeleteCompleted { report, .. } => self.state.finish_delete(&report),
        }
    }

    fn handle_export(&mut self) {
        let Some(report) = self.state.last_report.as_ref() else {
            self.state.set_status(StatusKind::Warning, "Nothing to export yet");
            return;
        };
        let path = PathBuf::from(format!(
            "mediasweep_report_{}.json",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ));
        match crate::export::json::export_json(report, &path) {
            Ok(()) => {
                tracing::info!("Exported to: {}", path.display());
                self.state
                    .set_status(StatusKind::Success, format!("Exported to {}", path.display()));
            }
            Err(e) => {
                tracing::error!("Export failed: {}", e);
                self.state.set_status(StatusKind::Error, format!("Export failed: {}", e));
            }
        }
    }
}
