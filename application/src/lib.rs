use chrono::{DateTime, Utc};
use domain::{Document, DocumentId, DomainError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

// --- Application Errors ---
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Domain validation error: {0}")]
    DomainError(#[from] DomainError), // Propagate domain errors cleanly
    #[error("Infrastructure error: {0}")]
    InfrastructureError(String),
}

// --- Infrastructure Interfaces (Traits) ---

/// Interface for the document collection. Implementations must preserve
/// insertion order: `find_by_id` resolves duplicate ids to the first match,
/// and `snapshot` returns documents in the order they were appended.
pub trait DocumentRepository: Send + Sync {
    /// Appends an already-validated document to the collection.
    fn append(&self, document: &Document) -> Result<(), ApplicationError>;
    /// Retrieves the first document (in insertion order) with the given id.
    fn find_by_id(&self, id: &DocumentId) -> Result<Option<Document>, ApplicationError>;
    /// Returns an ordered copy of the collection for search evaluation.
    fn snapshot(&self) -> Result<Vec<Document>, ApplicationError>;
    /// Returns the number of stored documents.
    fn count(&self) -> Result<usize, ApplicationError>;
}

/// Interface for search evaluation over a collection snapshot.
///
/// Evaluation is a pure read-only projection: given a snapshot and a request,
/// return the matching subset in snapshot order. It never fails for a
/// well-formed request.
pub trait SearchEvaluator: Send + Sync {
    fn evaluate(
        &self,
        snapshot: &[Document],
        request: &SearchRequest,
    ) -> Result<Vec<Document>, ApplicationError>;
}

// --- Request/Outcome Models ---

/// A multi-predicate search request. Each field is independently optional;
/// an empty list or `None` means "no constraint on this dimension". Populated
/// predicates combine with logical AND.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
    /// Match documents whose title starts with at least one of these prefixes.
    #[serde(default)]
    pub title_prefixes: Vec<String>,
    /// Match documents whose content contains at least one of these substrings.
    #[serde(default)]
    pub contains_contents: Vec<String>,
    /// Match documents authored by any of these author ids.
    #[serde(default)]
    pub author_ids: Vec<String>,
    /// Inclusive lower bound on the creation timestamp.
    #[serde(default)]
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the creation timestamp.
    #[serde(default)]
    pub created_to: Option<DateTime<Utc>>,
}

impl SearchRequest {
    /// True when no predicate is populated, i.e. the request matches everything.
    pub fn is_unconstrained(&self) -> bool {
        self.title_prefixes.is_empty()
            && self.contains_contents.is_empty()
            && self.author_ids.is_empty()
            && self.created_from.is_none()
            && self.created_to.is_none()
    }
}

/// Outcome of a batch upsert.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub total_processed: usize,
    pub stored: usize,
}

// --- Application Services (Use Cases) ---

/// Service owning upsert and lookup over the document collection.
///
/// Upsert is the validation gate: a document is only handed to the repository
/// after its rules pass, and identity is assigned here when absent.
pub struct DocumentService {
    repository: Arc<dyn DocumentRepository>,
}

impl DocumentService {
    pub fn new(repository: Arc<dyn DocumentRepository>) -> Self {
        Self { repository }
    }

    /// Validates and stores a document, assigning a generated id when the
    /// document carries none (or a blank one). Returns the stored document
    /// with its final id. On validation failure nothing is stored and the
    /// failure reason is reported as a typed error.
    #[instrument(skip(self, document), fields(title = %document.title()))]
    pub fn upsert(&self, document: Document) -> Result<Document, ApplicationError> {
        if let Err(err) = document.validate(Utc::now()) {
            warn!(reason = %err, "Upsert rejected by validation");
            return Err(err.into());
        }

        let document = self.ensure_identity(document);
        // Invariant: identity is assigned exactly once; re-upserting the
        // returned document keeps its id.
        self.repository.append(&document)?;

        let doc_id = document.id().map(DocumentId::as_str).unwrap_or_default();
        info!(doc_id = %doc_id, "Document stored");
        Ok(document)
    }

    /// Validates every document in the batch first; if any fails, the whole
    /// batch is rejected and nothing is stored. Otherwise all documents are
    /// stored in the given order.
    #[instrument(skip(self, documents), fields(batch_size = documents.len()))]
    pub fn upsert_batch(
        &self,
        documents: Vec<Document>,
    ) -> Result<BatchOutcome, ApplicationError> {
        if documents.is_empty() {
            warn!("Received an empty batch");
            return Ok(BatchOutcome {
                total_processed: 0,
                stored: 0,
            });
        }

        let total_processed = documents.len();
        // One reference instant for the whole batch.
        let now = Utc::now();

        let mut validation_errors = Vec::new();
        for (index, document) in documents.iter().enumerate() {
            if let Err(err) = document.validate(now) {
                let message = format!("Document at index {index} failed validation: {err}");
                warn!("{}", message);
                validation_errors.push(message);
            }
        }
        if !validation_errors.is_empty() {
            return Err(ApplicationError::InvalidInput(format!(
                "Batch contained {} validation errors. First error: {}",
                validation_errors.len(),
                validation_errors
                    .first()
                    .map(String::as_str)
                    .unwrap_or("unknown validation error")
            )));
        }

        let mut stored = 0;
        for document in documents {
            let document = self.ensure_identity(document);
            self.repository.append(&document)?;
            stored += 1;
        }

        info!(total_processed, stored, "Document batch stored");
        Ok(BatchOutcome {
            total_processed,
            stored,
        })
    }

    /// Looks up a document by id. An unknown (or empty) id yields `None`;
    /// not-found is not an error.
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: &str) -> Result<Option<Document>, ApplicationError> {
        debug!(doc_id = %id, "Looking up document by id");
        self.repository.find_by_id(&DocumentId::new(id.to_string()))
    }

    /// Returns the total number of stored documents.
    pub fn count(&self) -> Result<usize, ApplicationError> {
        self.repository.count()
    }

    fn ensure_identity(&self, document: Document) -> Document {
        match document.id() {
            Some(id) if !id.is_blank() => document,
            _ => {
                let id = DocumentId::generate();
                debug!(doc_id = %id.as_str(), "Assigned generated document id");
                document.with_id(id)
            }
        }
    }
}

/// Service answering multi-predicate searches over the current collection
/// snapshot. Pure read path; no side effects.
pub struct SearchService {
    repository: Arc<dyn DocumentRepository>,
    evaluator: Arc<dyn SearchEvaluator>,
}

impl SearchService {
    pub fn new(repository: Arc<dyn DocumentRepository>, evaluator: Arc<dyn SearchEvaluator>) -> Self {
        Self {
            repository,
            evaluator,
        }
    }

    /// Evaluates the request against the current snapshot and returns the
    /// matching documents in insertion order.
    #[instrument(skip(self, request), fields(
        prefixes = request.title_prefixes.len(),
        contents = request.contains_contents.len(),
        authors = request.author_ids.len(),
    ))]
    pub fn search(&self, request: &SearchRequest) -> Result<Vec<Document>, ApplicationError> {
        if request.is_unconstrained() {
            debug!("Search request carries no predicates; returning full snapshot");
        }

        let snapshot = self.repository.snapshot()?;
        let matches = self.evaluator.evaluate(&snapshot, request)?;

        info!(
            candidates = snapshot.len(),
            matched = matches.len(),
            "Search finished"
        );
        Ok(matches)
    }
}
