//! Browser extraction wire types.

use serde::{Deserialize, Serialize};

/// A module link discovered on a course landing page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleLink {
    /// Link text or heading.
    pub title: String,
    /// Absolute URL of the module page.
    pub url: String,
    /// Position within the course navigation.
    pub order: u32,
}

/// Kind of media reference found on a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// `<video>` elements and embedded players.
    Video,
    /// `<audio>` elements.
    Audio,
    /// Downloadable attachments (pdf, doc, slides, archives).
    File,
}

impl MediaKind {
    /// Stable string form used in logs and summaries.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::File => "file",
        }
    }
}

/// A single media reference extracted from a page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRef {
    /// What kind of media this is.
    pub kind: MediaKind,
    /// Source URL.
    pub url: String,
    /// Title, label, or link text if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Everything extracted from one module page.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageExtract {
    /// Visible text content of the main region.
    pub text: String,
    /// Section headings, in document order.
    #[serde(default)]
    pub headings: Vec<String>,
    /// Media references found on the page.
    pub media: Vec<MediaRef>,
    /// Base64 screenshot, when the driver captured one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
}

impl PageExtract {
    /// Count media references of one kind.
    #[must_use]
    pub fn media_count(&self, kind: MediaKind) -> u32 {
        #[allow(clippy::cast_possible_truncation)]
        let count = self.media.iter().filter(|m| m.kind == kind).count() as u32;
        count
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
