//! Knowledge corpus — the aggregated output of an ingestion run.
//!
//! A corpus is produced once (by the content aggregator, or by the
//! file-upload collaborator for uploaded material) and read-only afterwards.
//! The assessment engine slices it when requesting question batches.

use serde::{Deserialize, Serialize};

use crate::ids::CorpusId;

/// Media reference totals across a corpus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaCounts {
    /// Embedded or linked videos.
    pub videos: u32,
    /// Embedded audio tracks.
    pub audios: u32,
    /// Downloadable file attachments.
    pub files: u32,
}

impl MediaCounts {
    /// Sum of all media references.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.videos + self.audios + self.files
    }

    /// Element-wise addition.
    #[must_use]
    pub fn merged(self, other: Self) -> Self {
        Self {
            videos: self.videos + other.videos,
            audios: self.audios + other.audios,
            files: self.files + other.files,
        }
    }
}

/// Condensed record of one ingested module.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSummary {
    /// Module title as discovered.
    pub title: String,
    /// Ordering index within the course.
    pub order: u32,
    /// Leading excerpt of the extracted text.
    pub preview: String,
    /// Media references found in this module.
    pub media: MediaCounts,
}

/// Aggregated, structured knowledge built from one ingestion run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeCorpus {
    /// Corpus identifier.
    pub id: CorpusId,
    /// Human-readable title (course title or upload name).
    pub title: String,
    /// Concatenated module text, per-module truncated.
    pub text: String,
    /// Deduplicated topic list, discovery order preserved.
    pub topics: Vec<String>,
    /// Deduplicated learning objectives, discovery order preserved.
    pub learning_objectives: Vec<String>,
    /// One summary per ingested module, in course order.
    pub module_summaries: Vec<ModuleSummary>,
    /// Media totals across all modules.
    pub media: MediaCounts,
}

impl KnowledgeCorpus {
    /// Create an empty corpus shell with a fresh ID.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: CorpusId::new(),
            title: title.into(),
            text: String::new(),
            topics: Vec::new(),
            learning_objectives: Vec::new(),
            module_summaries: Vec::new(),
            media: MediaCounts::default(),
        }
    }

    /// Whether the corpus contains no usable text.
    ///
    /// An empty corpus is rejected by the assessment engine before any
    /// generation call is made.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Approximate word count of the aggregated text.
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
