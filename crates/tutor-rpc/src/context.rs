//! RPC dependency-injection context.

use std::sync::Arc;

use tutor_assess::engine::AssessmentEngine;
use tutor_core::corpus::KnowledgeCorpus;
use tutor_ingest::orchestrator::IngestOrchestrator;
use tutor_store::SessionStore;

/// Shared context passed to every RPC handler.
pub struct RpcContext {
    /// Course-ingestion orchestrator.
    pub orchestrator: Arc<IngestOrchestrator>,
    /// Assessment engine.
    pub engine: Arc<AssessmentEngine>,
    /// Corpus store, shared between ingestion (writer) and training
    /// handlers (reader).
    pub corpora: Arc<dyn SessionStore<KnowledgeCorpus>>,
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_helpers::make_test_context;

    #[tokio::test]
    async fn context_shares_corpus_store_with_engine() {
        let ctx = make_test_context();
        let corpus = tutor_core::corpus::KnowledgeCorpus::new("shared");
        ctx.corpora.put(corpus.id.as_str(), corpus.clone()).unwrap();
        // The engine reads the same store the context exposes.
        let err = ctx
            .engine
            .start(corpus.id.as_str(), tutor_assess::training::TrainingOptions::default())
            .await
            .unwrap_err();
        // Stored but empty: the engine saw it and rejected the content,
        // not the identifier.
        assert!(matches!(err, tutor_assess::engine::AssessError::EmptyCorpus));
    }
}
