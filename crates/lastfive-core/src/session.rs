//! Analysis session
//!
//! One session owns one message timeline. A query moves through it in two
//! steps so the caller can run the network call wherever it likes:
//!
//! 1. [`SessionState::submit`] validates the query, appends the user message
//!    and a loading placeholder, and hands back a [`PendingAnalysis`].
//! 2. [`SessionState::complete`] takes the service outcome, substitutes the
//!    fallback report on failure, swaps the placeholder for the rendered
//!    report, starts the score animation, and records the query in history.
//!
//! At most one analysis is in flight per session; extra submissions are
//! rejected, not queued.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::animation::{AnimationController, FrameOutcome, ScoreDisplay};
use crate::compose::{compose, sanitize, SectionKind, SectionTree};
use crate::disclosure::SectionDisclosure;
use crate::error::Failure;
use crate::fallback;
use crate::history::HistoryStore;
use crate::report::{AnalysisRequest, Report};
use crate::transport::ReasoningService;

pub type MessageId = u64;

/// The role of a timeline message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Assistant,
}

/// Where a rendered report came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSource {
    Live,
    Fallback,
}

/// A report ready for display, with its own disclosure and score state
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub report: Arc<Report>,
    pub sections: SectionTree,
    pub source: ReportSource,
    pub disclosure: SectionDisclosure,
    pub score: ScoreDisplay,
}

#[derive(Debug, Clone)]
pub enum MessageContent {
    Text(String),
    Loading,
    Report(Box<RenderedReport>),
}

#[derive(Debug, Clone)]
pub struct Message {
    pub id: MessageId,
    pub role: ChatRole,
    pub content: MessageContent,
}

impl Message {
    pub fn is_loading(&self) -> bool {
        matches!(self.content, MessageContent::Loading)
    }

    pub fn as_report(&self) -> Option<&RenderedReport> {
        match &self.content {
            MessageContent::Report(rendered) => Some(rendered),
            _ => None,
        }
    }
}

/// Ticket for an accepted submission; pass it back to [`SessionState::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAnalysis {
    pub ticket: u64,
    pub request: AnalysisRequest,
}

#[derive(Debug, Clone)]
struct InFlight {
    ticket: u64,
    placeholder: MessageId,
    request: AnalysisRequest,
}

/// Pick the report to show for a service outcome.
pub fn resolve(outcome: Result<Report, Failure>, product_name: &str) -> (Report, ReportSource) {
    match outcome {
        Ok(report) => (report.normalized(), ReportSource::Live),
        Err(failure) => {
            warn!(kind = failure.kind(), error = %failure, product = %product_name, "using fallback report");
            (fallback::generate(product_name), ReportSource::Fallback)
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionState {
    messages: Vec<Message>,
    next_message_id: MessageId,
    next_ticket: u64,
    in_flight: Option<InFlight>,
    animation: AnimationController,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, role: ChatRole, content: MessageContent) -> MessageId {
        self.next_message_id += 1;
        let id = self.next_message_id;
        self.messages.push(Message { id, role, content });
        id
    }

    /// Accept a query, or return `None` when it is blank or an analysis is
    /// already running.
    pub fn submit(&mut self, text: &str) -> Option<PendingAnalysis> {
        if self.in_flight.is_some() {
            debug!("analysis already in flight, ignoring submission");
            return None;
        }

        let request = AnalysisRequest::from_query(text)?;

        self.push(ChatRole::User, MessageContent::Text(sanitize(text.trim())));
        let placeholder = self.push(ChatRole::Assistant, MessageContent::Loading);

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.in_flight = Some(InFlight {
            ticket,
            placeholder,
            request: request.clone(),
        });

        info!(ticket, product = %request.product_name, "analysis started");
        Some(PendingAnalysis { ticket, request })
    }

    /// Finish the analysis identified by `ticket`.
    ///
    /// Returns the id of the rendered report message, or `None` when the ticket
    /// is stale (for example after [`SessionState::new_session`]).
    pub fn complete(
        &mut self,
        ticket: u64,
        outcome: Result<Report, Failure>,
        history: &mut HistoryStore,
        now: Instant,
    ) -> Option<MessageId> {
        let in_flight = match self.in_flight.take() {
            Some(in_flight) if in_flight.ticket == ticket => in_flight,
            other => {
                self.in_flight = other;
                debug!(ticket, "dropping result for stale analysis");
                return None;
            }
        };

        let (report, source) = resolve(outcome, &in_flight.request.product_name);
        let sections = compose(&report);
        let score = self.animation.animate(report.display_score(), now);
        let risk_level = report.risk_level;

        let position = self
            .messages
            .iter()
            .position(|m| m.id == in_flight.placeholder)
            .unwrap_or(self.messages.len());
        if position < self.messages.len() {
            self.messages.remove(position);
        }

        self.next_message_id += 1;
        let id = self.next_message_id;
        self.messages.insert(
            position,
            Message {
                id,
                role: ChatRole::Assistant,
                content: MessageContent::Report(Box::new(RenderedReport {
                    report: Arc::new(report),
                    sections,
                    source,
                    disclosure: SectionDisclosure::new(),
                    score,
                })),
            },
        );

        if let Err(err) = history.record(&in_flight.request.product_name, risk_level, Utc::now()) {
            warn!(error = %err, "failed to persist history");
        }

        info!(ticket, ?source, "analysis complete");
        Some(id)
    }

    /// Submit and run the whole pipeline against `service` in one call.
    pub async fn submit_and_wait(
        &mut self,
        text: &str,
        service: &dyn ReasoningService,
        history: &mut HistoryStore,
    ) -> Option<MessageId> {
        let pending = self.submit(text)?;
        let outcome = service.analyze(&pending.request).await;
        self.complete(pending.ticket, outcome, history, Instant::now())
    }

    /// Clear the timeline; history is left alone.
    pub fn new_session(&mut self) {
        self.messages.clear();
        self.in_flight = None;
        self.animation.cancel();
        info!("new session");
    }

    /// Advance the score animation of the latest report.
    ///
    /// Returns `true` while there are more frames to draw.
    pub fn step_animation(&mut self, now: Instant) -> bool {
        if !self.animation.is_running() {
            return false;
        }

        let animation = &mut self.animation;
        let latest = self.messages.iter_mut().rev().find_map(|m| match &mut m.content {
            MessageContent::Report(rendered) => Some(rendered),
            _ => None,
        });

        match latest {
            Some(rendered) => matches!(
                animation.step(&mut rendered.score, now),
                FrameOutcome::Running(_)
            ),
            None => false,
        }
    }

    /// Score to draw for `rendered`: the animated value for the live
    /// animation, the final score for anything older.
    pub fn displayed_score(&self, rendered: &RenderedReport) -> u8 {
        if self.animation.is_current(&rendered.score) {
            rendered.score.value()
        } else {
            rendered.report.display_score()
        }
    }

    /// Toggle one section of the report in message `id`.
    pub fn toggle_section(&mut self, id: MessageId, kind: SectionKind) -> Option<bool> {
        self.messages
            .iter_mut()
            .find(|m| m.id == id)
            .and_then(|m| match &mut m.content {
                MessageContent::Report(rendered) => Some(rendered.disclosure.toggle(kind)),
                _ => None,
            })
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn pending_request(&self) -> Option<&AnalysisRequest> {
        self.in_flight.as_ref().map(|f| &f.request)
    }

    pub fn latest_report(&self) -> Option<(MessageId, &RenderedReport)> {
        self.messages
            .iter()
            .rev()
            .find_map(|m| m.as_report().map(|r| (m.id, r)))
    }
}
