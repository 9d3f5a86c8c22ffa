pub mod animation;
pub mod compose;
pub mod config;
pub mod disclosure;
pub mod error;
pub mod fallback;
pub mod history;
pub mod report;
pub mod session;
pub mod transport;

// Re-export main types for convenience
pub use animation::{AnimationController, FrameOutcome, ScoreDisplay};
pub use compose::{compose, sanitize, Section, SectionBody, SectionKind, SectionTree, SeverityTier};
pub use config::Config;
pub use disclosure::SectionDisclosure;
pub use error::{Failure, StorageError};
pub use history::{HistoryEntry, HistoryStore, KeyValueStore, MemoryStore, SqliteStore};
pub use report::{AnalysisRequest, Report, RiskLevel};
pub use session::{ChatRole, Message, MessageContent, MessageId, PendingAnalysis, RenderedReport, ReportSource, SessionState};
pub use transport::{ReasoningService, ServiceHealth, TransportClient};
