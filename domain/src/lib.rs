use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// --- Domain Errors ---
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Missing required field '{0}'")]
    MissingField(String),
    #[error("Invalid field value for field '{field}': {reason}")]
    InvalidFieldValue { field: String, reason: String },
}

// --- Document ID ---
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Generates a fresh random identifier (UUID v4 rendered as a string).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An id consisting only of whitespace counts as absent for upsert purposes.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl From<DocumentId> for String {
    fn from(doc_id: DocumentId) -> Self {
        doc_id.0
    }
}

// --- Author ---

/// The author of a document. Identity is carried by `id`; the store does not
/// enforce any uniqueness beyond what the caller supplies.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: String,
    pub name: String,
}

impl Author {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

// --- Document ---

/// A stored record with title, content, author, creation time, and identity.
///
/// `id` is `None` until the store assigns one; documents returned from a
/// successful upsert always carry `Some(id)`. The creation timestamp is set
/// by the caller and is never rewritten by the store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Document {
    #[serde(default)]
    id: Option<DocumentId>,
    title: String,
    content: String,
    author: Author,
    created: DateTime<Utc>,
}

impl Document {
    /// Creates a document without an identity; the store assigns one on upsert.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        author: Author,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: content.into(),
            author,
            created,
        }
    }

    /// Returns a copy of this document carrying the given identity.
    pub fn with_id(self, id: DocumentId) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }

    pub fn id(&self) -> Option<&DocumentId> {
        self.id.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// Checks the rules every document must satisfy before it may be stored:
    /// non-blank title, non-blank content, an author with a non-blank id, and
    /// a creation timestamp that is not after `now`.
    ///
    /// `now` is passed in rather than read from the clock so the rules stay
    /// deterministic under test; the caller supplies the instant at which
    /// validation happens.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if is_blank(&self.title) {
            return Err(DomainError::MissingField("title".to_string()));
        }
        if is_blank(&self.content) {
            return Err(DomainError::MissingField("content".to_string()));
        }
        if is_blank(&self.author.id) {
            return Err(DomainError::MissingField("author.id".to_string()));
        }
        if self.created > now {
            return Err(DomainError::InvalidFieldValue {
                field: "created".to_string(),
                reason: format!(
                    "creation time {} is in the future (validated at {})",
                    self.created, now
                ),
            });
        }
        Ok(())
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
