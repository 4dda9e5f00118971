use application::{ApplicationError, SearchEvaluator, SearchRequest};
use chrono::{DateTime, Utc};
use domain::Document;
use tracing::{debug, instrument, trace};

/// Search evaluator that scans the full snapshot document by document.
/// WARNING: naive linear scan, no indexing. Fine for the small bounded
/// collections this store is meant for.
///
/// A document matches when it passes every populated predicate; empty
/// predicates are unconstrained. Snapshot order is preserved, so results come
/// back in insertion order.
#[derive(Debug, Clone, Default)]
pub struct LinearScanEvaluator;

impl LinearScanEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl SearchEvaluator for LinearScanEvaluator {
    #[instrument(skip(self, snapshot, request))]
    fn evaluate(
        &self,
        snapshot: &[Document],
        request: &SearchRequest,
    ) -> Result<Vec<Document>, ApplicationError> {
        let matches: Vec<Document> = snapshot
            .iter()
            .filter(|doc| matches_author(doc, &request.author_ids))
            .filter(|doc| matches_created_range(doc, request.created_from, request.created_to))
            .filter(|doc| matches_title_prefix(doc, &request.title_prefixes))
            .filter(|doc| matches_content(doc, &request.contains_contents))
            .cloned()
            .collect();

        debug!(
            candidates = snapshot.len(),
            matched = matches.len(),
            "Linear scan finished"
        );
        Ok(matches)
    }
}

fn matches_author(doc: &Document, author_ids: &[String]) -> bool {
    if author_ids.is_empty() {
        return true;
    }
    author_ids.iter().any(|id| id == &doc.author().id)
}

/// Inclusive on both ends; each bound is independently optional.
fn matches_created_range(
    doc: &Document,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> bool {
    let created = doc.created();
    if from.is_some_and(|from| created < from) {
        trace!(doc_created = %created, "Document precedes created_from");
        return false;
    }
    if to.is_some_and(|to| created > to) {
        trace!(doc_created = %created, "Document follows created_to");
        return false;
    }
    true
}

fn matches_title_prefix(doc: &Document, prefixes: &[String]) -> bool {
    if prefixes.is_empty() {
        return true;
    }
    // Case-sensitive: at least one prefix must match.
    prefixes
        .iter()
        .any(|prefix| doc.title().starts_with(prefix.as_str()))
}

fn matches_content(doc: &Document, substrings: &[String]) -> bool {
    if substrings.is_empty() {
        return true;
    }
    substrings
        .iter()
        .any(|substring| doc.content().contains(substring.as_str()))
}
