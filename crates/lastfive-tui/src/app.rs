use std::sync::Arc;
use std::time::Instant;
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use lastfive_core::{
    Config, Failure, HistoryStore, KeyValueStore, MemoryStore, ReasoningService, Report,
    SectionKind, ServiceHealth, SessionState, SqliteStore, TransportClient,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Input,
    Timeline,
    History,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceStatus {
    Checking,
    Online {
        version: Option<String>,
        provider: Option<String>,
    },
    Offline,
}

/// The one analysis request running in the background
pub struct QueryTask {
    pub ticket: u64,
    pub handle: JoinHandle<Result<Report, Failure>>,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Query input
    pub query_input: String,
    pub query_cursor: usize, // cursor position in query_input (chars)

    // Analysis session
    pub session: SessionState,
    pub history: HistoryStore,
    pub client: TransportClient,
    pub service: Arc<dyn ReasoningService>,
    pub query_task: Option<QueryTask>,
    pub health_task: Option<JoinHandle<Result<ServiceHealth, Failure>>>,
    pub service_status: ServiceStatus,

    // Timeline view
    pub timeline_scroll: u16,
    pub timeline_height: u16,
    pub total_timeline_lines: u16,
    pub follow_timeline: bool, // keep the newest message in view
    pub section_cursor: usize, // index into SectionKind::ALL of the latest report

    // History sidebar
    pub history_state: ListState,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub timeline_area: Option<Rect>,
    pub history_area: Option<Rect>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let client = TransportClient::from_config(config);
        let service: Arc<dyn ReasoningService> = Arc::new(client.clone());
        let history = open_history(config);

        info!(service_url = %client.base_url(), "app initialized");

        Self::with_parts(client, service, history)
    }

    pub fn with_parts(
        client: TransportClient,
        service: Arc<dyn ReasoningService>,
        history: HistoryStore,
    ) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Input,

            query_input: String::new(),
            query_cursor: 0,

            session: SessionState::new(),
            history,
            client,
            service,
            query_task: None,
            health_task: None,
            service_status: ServiceStatus::Checking,

            timeline_scroll: 0,
            timeline_height: 0,
            total_timeline_lines: 0,
            follow_timeline: true,
            section_cursor: 0,

            history_state: ListState::default(),

            animation_frame: 0,

            timeline_area: None,
            history_area: None,
        }
    }

    /// Probe the service once in the background; the header shows the result.
    pub fn start_health_check(&mut self) {
        let client = self.client.clone();
        self.service_status = ServiceStatus::Checking;
        self.health_task = Some(tokio::spawn(async move { client.health().await }));
    }

    pub async fn poll_health_task(&mut self) {
        if !self.health_task.as_ref().is_some_and(|t| t.is_finished()) {
            return;
        }
        let Some(handle) = self.health_task.take() else {
            return;
        };

        self.service_status = match handle.await {
            Ok(Ok(health)) => {
                info!(status = %health.status, "reasoning service online");
                ServiceStatus::Online {
                    version: health.version,
                    provider: health.llm_provider,
                }
            }
            Ok(Err(err)) => {
                warn!(error = %err, "reasoning service offline, reports will be estimated locally");
                ServiceStatus::Offline
            }
            Err(err) => {
                warn!(error = %err, "health probe task failed");
                ServiceStatus::Offline
            }
        };
    }

    /// Submit whatever is in the input box.
    pub fn submit_query(&mut self) {
        let text = self.query_input.clone();
        if self.submit_text(&text) {
            self.query_input.clear();
            self.query_cursor = 0;
        }
    }

    /// Start an analysis; returns `false` when the session rejected it.
    pub fn submit_text(&mut self, text: &str) -> bool {
        let Some(pending) = self.session.submit(text) else {
            return false;
        };

        let service = Arc::clone(&self.service);
        let request = pending.request;
        self.query_task = Some(QueryTask {
            ticket: pending.ticket,
            handle: tokio::spawn(async move { service.analyze(&request).await }),
        });

        self.follow_timeline = true;
        true
    }

    /// Hand a finished analysis back to the session.
    pub async fn poll_query_task(&mut self) {
        if !self.query_task.as_ref().is_some_and(|t| t.handle.is_finished()) {
            return;
        }
        let Some(task) = self.query_task.take() else {
            return;
        };

        let outcome = match task.handle.await {
            Ok(outcome) => outcome,
            Err(err) => Err(Failure::Network(format!("analysis task failed: {}", err))),
        };

        self.session
            .complete(task.ticket, outcome, &mut self.history, Instant::now());

        self.section_cursor = 0;
        self.follow_timeline = true;
        self.clamp_history_selection();
    }

    pub fn new_session(&mut self) {
        if let Some(task) = self.query_task.take() {
            task.handle.abort();
        }
        self.session.new_session();
        self.timeline_scroll = 0;
        self.total_timeline_lines = 0;
        self.section_cursor = 0;
        self.follow_timeline = true;
        self.focus = FocusPane::Input;
        self.input_mode = InputMode::Editing;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Advance the score count-up (called by Frame event)
    pub fn step_score(&mut self, now: Instant) {
        self.session.step_animation(now);
    }

    // Report section navigation
    pub fn section_nav_down(&mut self) {
        let last = SectionKind::ALL.len() - 1;
        self.section_cursor = (self.section_cursor + 1).min(last);
    }

    pub fn section_nav_up(&mut self) {
        self.section_cursor = self.section_cursor.saturating_sub(1);
    }

    pub fn selected_section(&self) -> SectionKind {
        SectionKind::ALL[self.section_cursor.min(SectionKind::ALL.len() - 1)]
    }

    /// Expand or collapse the selected section of the latest report
    pub fn toggle_selected_section(&mut self) {
        let kind = self.selected_section();
        if let Some((id, _)) = self.session.latest_report() {
            self.session.toggle_section(id, kind);
        }
    }

    // History sidebar
    pub fn history_nav_down(&mut self) {
        let len = self.history.visible().len();
        if len > 0 {
            let i = self.history_state.selected().unwrap_or(0);
            self.history_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn history_nav_up(&mut self) {
        if !self.history.visible().is_empty() {
            let i = self.history_state.selected().unwrap_or(0);
            self.history_state.select(Some(i.saturating_sub(1)));
        }
    }

    /// Run the selected history entry again
    pub fn rerun_selected_history(&mut self) -> bool {
        let Some(product) = self
            .history_state
            .selected()
            .and_then(|i| self.history.visible().get(i))
            .map(|entry| entry.product_name.clone())
        else {
            return false;
        };
        self.submit_text(&product)
    }

    pub fn clear_history(&mut self) {
        if let Err(err) = self.history.clear() {
            warn!(error = %err, "failed to clear history");
        }
        self.history_state.select(None);
    }

    fn clamp_history_selection(&mut self) {
        let len = self.history.visible().len();
        match self.history_state.selected() {
            Some(i) if i >= len => self.history_state.select(len.checked_sub(1)),
            None if len > 0 && self.focus == FocusPane::History => self.history_state.select(Some(0)),
            _ => {}
        }
    }

    // Timeline scrolling
    pub fn scroll_down(&mut self) {
        let max_scroll = self.total_timeline_lines.saturating_sub(self.timeline_height);
        self.timeline_scroll = (self.timeline_scroll + 1).min(max_scroll);
        self.follow_timeline = self.timeline_scroll >= max_scroll;
    }

    pub fn scroll_up(&mut self) {
        self.timeline_scroll = self.timeline_scroll.saturating_sub(1);
        self.follow_timeline = false;
    }

    pub fn scroll_half_page_down(&mut self) {
        for _ in 0..(self.timeline_height / 2).max(1) {
            self.scroll_down();
        }
    }

    pub fn scroll_half_page_up(&mut self) {
        for _ in 0..(self.timeline_height / 2).max(1) {
            self.scroll_up();
        }
    }
}

/// SQLite history, or an in-memory log when no database can be opened
fn open_history(config: &Config) -> HistoryStore {
    let opened = config
        .history_path()
        .and_then(|path| SqliteStore::open(&path).map_err(anyhow::Error::from));

    let backend: Box<dyn KeyValueStore> = match opened {
        Ok(store) => Box::new(store),
        Err(err) => {
            warn!(error = %err, "history database unavailable, history will not survive restart");
            Box::new(MemoryStore::new())
        }
    };

    HistoryStore::open(backend)
}
