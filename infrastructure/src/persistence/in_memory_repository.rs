use application::{ApplicationError, DocumentRepository};
use domain::{Document, DocumentId};
use std::sync::RwLock;
use tracing::{debug, instrument};

// --- Document Repository Implementation ---

/// Insertion-ordered in-memory document collection.
///
/// Documents live in a `Vec` so that lookup and search see them in the order
/// they were appended; duplicate ids are kept as distinct entries and
/// `find_by_id` resolves to the first one. The collection is an explicitly
/// owned instance with no process-wide state; callers share it via `Arc`.
#[derive(Debug, Default)]
pub struct InMemoryDocumentRepository {
    documents: RwLock<Vec<Document>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
        }
    }
}

// A poisoned lock means a writer panicked mid-append; surface it as an
// infrastructure fault rather than unwinding further.
fn lock_poisoned() -> ApplicationError {
    ApplicationError::InfrastructureError("document collection lock poisoned".to_string())
}

impl DocumentRepository for InMemoryDocumentRepository {
    #[instrument(skip(self, document))]
    fn append(&self, document: &Document) -> Result<(), ApplicationError> {
        let doc_id = document.id().map(DocumentId::as_str).unwrap_or_default();
        debug!(doc_id = %doc_id, "Appending document to in-memory collection");
        let mut documents = self.documents.write().map_err(|_| lock_poisoned())?;
        documents.push(document.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    fn find_by_id(&self, id: &DocumentId) -> Result<Option<Document>, ApplicationError> {
        debug!(doc_id = %id.as_str(), "Getting document from in-memory collection");
        let documents = self.documents.read().map_err(|_| lock_poisoned())?;
        // First match in insertion order wins.
        Ok(documents
            .iter()
            .find(|doc| doc.id().is_some_and(|candidate| candidate == id))
            .cloned())
    }

    #[instrument(skip(self))]
    fn snapshot(&self) -> Result<Vec<Document>, ApplicationError> {
        let documents = self.documents.read().map_err(|_| lock_poisoned())?;
        debug!(count = documents.len(), "Taking collection snapshot");
        Ok(documents.clone())
    }

    fn count(&self) -> Result<usize, ApplicationError> {
        let documents = self.documents.read().map_err(|_| lock_poisoned())?;
        Ok(documents.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::Author;

    fn stored_doc(id: &str, title: &str) -> Document {
        Document::new(title, "body", Author::new("a1", "Ada"), Utc::now())
            .with_id(DocumentId::new(id.to_string()))
    }

    #[test]
    fn append_preserves_insertion_order() {
        let repo = InMemoryDocumentRepository::new();
        repo.append(&stored_doc("1", "first")).unwrap();
        repo.append(&stored_doc("2", "second")).unwrap();
        repo.append(&stored_doc("3", "third")).unwrap();

        let titles: Vec<_> = repo
            .snapshot()
            .unwrap()
            .iter()
            .map(|doc| doc.title().to_string())
            .collect();
        assert_eq!(titles, ["first", "second", "third"]);
        assert_eq!(repo.count().unwrap(), 3);
    }

    #[test]
    fn find_by_id_returns_first_duplicate() {
        let repo = InMemoryDocumentRepository::new();
        repo.append(&stored_doc("dup", "first")).unwrap();
        repo.append(&stored_doc("dup", "second")).unwrap();

        let found = repo
            .find_by_id(&DocumentId::new("dup".to_string()))
            .unwrap()
            .expect("document should be found");
        assert_eq!(found.title(), "first");
        // Both entries remain stored.
        assert_eq!(repo.count().unwrap(), 2);
    }

    #[test]
    fn find_by_unknown_id_is_none() {
        let repo = InMemoryDocumentRepository::new();
        repo.append(&stored_doc("1", "first")).unwrap();

        assert!(repo
            .find_by_id(&DocumentId::new("missing".to_string()))
            .unwrap()
            .is_none());
        assert!(repo
            .find_by_id(&DocumentId::new(String::new()))
            .unwrap()
            .is_none());
    }
}
