// Module declarations
pub mod persistence;
pub mod search;

// Re-export all implementations
pub use persistence::InMemoryDocumentRepository;
pub use search::linear_scan::LinearScanEvaluator;
