//! Content aggregation — pure fold from processed modules to a corpus.
//!
//! Deterministic and side-effect-free, so re-aggregation after a module is
//! reprocessed is always safe. Failed modules contribute their title and
//! nothing else.

use tutor_core::constants::DEFAULT_MODULE_TEXT_LIMIT;
use tutor_core::corpus::{KnowledgeCorpus, ModuleSummary};

use crate::session::Module;

/// Characters kept from each module for its summary preview.
const PREVIEW_LIMIT: usize = 500;

/// Tunables for aggregation.
#[derive(Clone, Debug)]
pub struct AggregatorConfig {
    /// Per-module character cap applied before concatenation.
    pub module_text_limit: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            module_text_limit: DEFAULT_MODULE_TEXT_LIMIT,
        }
    }
}

/// Build a [`KnowledgeCorpus`] from a processed module list.
#[must_use]
pub fn aggregate(title: &str, modules: &[Module], config: &AggregatorConfig) -> KnowledgeCorpus {
    let mut corpus = KnowledgeCorpus::new(title);
    let mut text_parts: Vec<String> = Vec::new();

    for module in modules {
        let media = module.media_counts();
        corpus.media = corpus.media.merged(media);

        let truncated = truncate_chars(&module.text, config.module_text_limit);
        if !truncated.trim().is_empty() {
            text_parts.push(format!("## {}\n\n{truncated}", module.title));
        }

        corpus.module_summaries.push(ModuleSummary {
            title: module.title.clone(),
            order: module.order,
            preview: truncate_chars(&module.text, PREVIEW_LIMIT),
            media,
        });

        push_unique(&mut corpus.topics, &module.title);
        for heading in &module.headings {
            push_unique(&mut corpus.topics, heading);
        }
    }

    corpus.text = text_parts.join("\n\n");
    corpus
}

/// Fold the course-level synthesis into a freshly aggregated corpus.
///
/// Topics and learning objectives from the synthesis are merged with the
/// heading-derived lists, first-seen order preserved. Called once, before the
/// corpus is stored; the corpus is read-only afterwards.
pub fn merge_synthesis(
    corpus: &mut KnowledgeCorpus,
    synthesis: &tutor_llm::generator::CourseSynthesis,
) {
    for topic in &synthesis.key_topics {
        push_unique(&mut corpus.topics, topic);
    }
    for outcome in &synthesis.learning_outcomes {
        push_unique(&mut corpus.learning_objectives, outcome);
    }
}

/// Append `value` if an equal entry (ignoring case and surrounding
/// whitespace) is not already present. Preserves first-seen order.
fn push_unique(list: &mut Vec<String>, value: &str) {
    let normalized = value.trim();
    if normalized.is_empty() {
        return;
    }
    let seen = list
        .iter()
        .any(|existing| existing.trim().eq_ignore_ascii_case(normalized));
    if !seen {
        list.push(normalized.to_owned());
    }
}

/// Truncate to at most `limit` characters.
fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_owned();
    }
    text.chars().take(limit).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_browser::types::{MediaKind, MediaRef};

    fn module(order: u32, title: &str, text: &str) -> Module {
        Module {
            title: title.into(),
            url: format!("https://campus.example/m{order}"),
            order,
            text: text.into(),
            headings: Vec::new(),
            media: Vec::new(),
            screenshot: None,
            error: None,
        }
    }

    #[test]
    fn concatenates_module_text_in_order() {
        let modules = vec![
            module(0, "Cells", "Cells are the unit of life."),
            module(1, "Energy", "ATP powers the cell."),
        ];
        let corpus = aggregate("Bio", &modules, &AggregatorConfig::default());
        let cells_pos = corpus.text.find("Cells are").unwrap();
        let energy_pos = corpus.text.find("ATP powers").unwrap();
        assert!(cells_pos < energy_pos);
        assert_eq!(corpus.module_summaries.len(), 2);
    }

    #[test]
    fn truncates_each_module_to_limit() {
        let long = "x".repeat(30_000);
        let modules = vec![module(0, "Long", &long)];
        let config = AggregatorConfig {
            module_text_limit: 100,
        };
        let corpus = aggregate("Bio", &modules, &config);
        // heading line + blank line + 100 chars
        assert!(corpus.text.chars().count() < 120);
    }

    #[test]
    fn counts_media_by_kind() {
        let mut m0 = module(0, "A", "text");
        m0.media = vec![
            MediaRef {
                kind: MediaKind::Video,
                url: "v1".into(),
                title: None,
            },
            MediaRef {
                kind: MediaKind::Audio,
                url: "a1".into(),
                title: None,
            },
        ];
        let mut m1 = module(1, "B", "text");
        m1.media = vec![MediaRef {
            kind: MediaKind::Video,
            url: "v2".into(),
            title: None,
        }];
        let corpus = aggregate("Bio", &[m0, m1], &AggregatorConfig::default());
        assert_eq!(corpus.media.videos, 2);
        assert_eq!(corpus.media.audios, 1);
        assert_eq!(corpus.media.files, 0);
    }

    #[test]
    fn topics_deduplicated_first_seen_order() {
        let mut m0 = module(0, "Cells", "text");
        m0.headings = vec!["Membranes".into(), "cells".into()];
        let mut m1 = module(1, "Energy", "text");
        m1.headings = vec!["Membranes ".into(), "Respiration".into()];
        let corpus = aggregate("Bio", &[m0, m1], &AggregatorConfig::default());
        assert_eq!(
            corpus.topics,
            vec!["Cells", "Membranes", "Energy", "Respiration"]
        );
    }

    #[test]
    fn failed_module_contributes_title_only() {
        let mut bad = module(1, "Broken", "");
        bad.error = Some("navigation timed out".into());
        let modules = vec![module(0, "Cells", "Cell text."), bad];
        let corpus = aggregate("Bio", &modules, &AggregatorConfig::default());
        assert!(!corpus.text.contains("Broken"));
        assert_eq!(corpus.module_summaries.len(), 2);
        assert!(corpus.topics.contains(&"Broken".to_owned()));
    }

    #[test]
    fn empty_module_list_yields_empty_corpus() {
        let corpus = aggregate("Bio", &[], &AggregatorConfig::default());
        assert!(corpus.is_empty());
        assert_eq!(corpus.media.total(), 0);
        assert!(corpus.module_summaries.is_empty());
    }

    #[test]
    fn aggregation_is_deterministic() {
        let modules = vec![
            module(0, "Cells", "Cells are the unit of life."),
            module(1, "Energy", "ATP powers the cell."),
        ];
        let config = AggregatorConfig::default();
        let a = aggregate("Bio", &modules, &config);
        let b = aggregate("Bio", &modules, &config);
        assert_eq!(a.text, b.text);
        assert_eq!(a.topics, b.topics);
        assert_eq!(a.media, b.media);
    }

    #[test]
    fn merge_synthesis_dedups_against_headings() {
        let mut m0 = module(0, "Cells", "text");
        m0.headings = vec!["Energy".into()];
        let mut corpus = aggregate("Bio", &[m0], &AggregatorConfig::default());
        let synthesis = tutor_llm::generator::CourseSynthesis {
            overview: "o".into(),
            key_topics: vec!["energy".into(), "Respiration".into()],
            learning_outcomes: vec!["Explain ATP production".into()],
            total_modules: 1,
            estimated_study_mins: None,
        };
        merge_synthesis(&mut corpus, &synthesis);
        assert_eq!(corpus.topics, vec!["Cells", "Energy", "Respiration"]);
        assert_eq!(corpus.learning_objectives, vec!["Explain ATP production"]);
    }

    #[test]
    fn preview_capped_at_limit() {
        let long = "word ".repeat(500);
        let modules = vec![module(0, "Long", &long)];
        let corpus = aggregate("Bio", &modules, &AggregatorConfig::default());
        assert!(corpus.module_summaries[0].preview.chars().count() <= PREVIEW_LIMIT);
    }
}
