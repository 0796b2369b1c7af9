//! Processing-session record and status machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tutor_browser::types::{MediaKind, MediaRef};
use tutor_core::corpus::MediaCounts;
use tutor_core::ids::{CorpusId, ProcessingSessionId};
use tutor_llm::generator::CourseSynthesis;

// ─────────────────────────────────────────────────────────────────────────────
// Status
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle states of an ingestion run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    /// Session created, browser not yet confirmed open.
    Initializing,
    /// Browser open at the course URL, waiting for manual authentication.
    AwaitingLogin,
    /// Enumerating module links on the landing page.
    DiscoveringModules,
    /// Iterating modules sequentially.
    ProcessingModules,
    /// Aggregating and synthesizing the course summary.
    Analyzing,
    /// Terminal: run finished with a summary.
    Completed,
    /// Terminal: stopped by request.
    Stopped,
    /// Terminal: unrecoverable fault, detail on the session record.
    Error,
}

impl ProcessingStatus {
    /// Whether no further transitions are allowed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Stopped | Self::Error)
    }

    /// Stable string form used on the wire and in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::AwaitingLogin => "awaiting_login",
            Self::DiscoveringModules => "discovering_modules",
            Self::ProcessingModules => "processing_modules",
            Self::Analyzing => "analyzing",
            Self::Completed => "completed",
            Self::Stopped => "stopped",
            Self::Error => "error",
        }
    }

    /// Whether the machine may move from `self` to `next`.
    ///
    /// `Error` and `Stopped` are reachable from any non-terminal state;
    /// everything else follows the forward path. `Analyzing` is reachable
    /// directly from `DiscoveringModules` for the empty-discovery case.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        if matches!(next, Self::Error | Self::Stopped) {
            return true;
        }
        matches!(
            (self, next),
            (Self::Initializing, Self::AwaitingLogin)
                | (Self::AwaitingLogin, Self::DiscoveringModules)
                | (Self::DiscoveringModules, Self::ProcessingModules | Self::Analyzing)
                | (Self::ProcessingModules, Self::Analyzing)
                | (Self::Analyzing, Self::Completed)
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Module
// ─────────────────────────────────────────────────────────────────────────────

/// One processed course module. Immutable once appended to a session.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    /// Module title as discovered.
    pub title: String,
    /// Source page URL.
    pub url: String,
    /// Position within the course.
    pub order: u32,
    /// Extracted text (empty when extraction failed).
    pub text: String,
    /// Section headings found on the page.
    #[serde(default)]
    pub headings: Vec<String>,
    /// Media references found on the page.
    pub media: Vec<MediaRef>,
    /// Base64 screenshot, when captured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    /// Extraction failure recorded for this module, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Module {
    /// Whether extraction of this module failed.
    #[must_use]
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }

    /// Media reference counts by kind.
    #[must_use]
    pub fn media_counts(&self) -> MediaCounts {
        let count = |kind: MediaKind| {
            #[allow(clippy::cast_possible_truncation)]
            let n = self.media.iter().filter(|m| m.kind == kind).count() as u32;
            n
        };
        MediaCounts {
            videos: count(MediaKind::Video),
            audios: count(MediaKind::Audio),
            files: count(MediaKind::File),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ProcessingSession
// ─────────────────────────────────────────────────────────────────────────────

/// The full record of one ingestion run.
///
/// Mutated only by the orchestrator; pollers read snapshots.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingSession {
    /// Session identifier.
    pub id: ProcessingSessionId,
    /// Current lifecycle state.
    pub status: ProcessingStatus,
    /// The course URL the run was opened at.
    pub course_url: String,
    /// Title of the landing page, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_title: Option<String>,
    /// Processed modules, appended in course order.
    pub modules: Vec<Module>,
    /// 1-based index of the module currently being processed.
    pub current_module: u32,
    /// Module count, fixed once discovery completes.
    pub total_modules: u32,
    /// Terminal course synthesis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<CourseSynthesis>,
    /// Corpus produced by this run, once analysis completes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus_id: Option<CorpusId>,
    /// Terminal error detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
}

impl ProcessingSession {
    /// Create a new session in `Initializing`.
    #[must_use]
    pub fn new(course_url: impl Into<String>) -> Self {
        Self {
            id: ProcessingSessionId::new(),
            status: ProcessingStatus::Initializing,
            course_url: course_url.into(),
            page_title: None,
            modules: Vec::new(),
            current_module: 0,
            total_modules: 0,
            summary: None,
            corpus_id: None,
            error: None,
            started_at: Utc::now(),
        }
    }

    /// Progress through the module list as a whole percentage.
    ///
    /// 100 only when the run has completed; a run with zero discovered
    /// modules reports 0 until it terminates.
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        if self.status == ProcessingStatus::Completed {
            return 100;
        }
        if self.total_modules == 0 {
            return 0;
        }
        let processed = self.modules.len() as u64;
        #[allow(clippy::cast_possible_truncation)]
        let pct = (processed * 100 / u64::from(self.total_modules)) as u8;
        pct.min(99)
    }

    /// Wire snapshot for status polling.
    #[must_use]
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            session_id: self.id.clone(),
            status: self.status,
            current_module: self.current_module,
            total_modules: self.total_modules,
            progress_percent: self.progress_percent(),
            page_title: self.page_title.clone(),
            summary: self.summary.clone(),
            corpus_id: self.corpus_id.clone(),
            error: self.error.clone(),
        }
    }
}

/// Point-in-time view returned to polling callers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    /// Session identifier.
    pub session_id: ProcessingSessionId,
    /// Current lifecycle state.
    pub status: ProcessingStatus,
    /// 1-based index of the module being processed.
    pub current_module: u32,
    /// Total discovered modules.
    pub total_modules: u32,
    /// Whole-number progress percentage.
    pub progress_percent: u8,
    /// Landing page title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_title: Option<String>,
    /// Terminal synthesis, present once completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<CourseSynthesis>,
    /// Corpus reference, present once completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus_id: Option<CorpusId>,
    /// Terminal error detail, present in the error state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
