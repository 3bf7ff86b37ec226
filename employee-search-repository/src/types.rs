//! Request and response types for search index operations.

use crate::errors::SearchIndexError;

/// Outcome of ensuring a collection exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    /// The collection was created by this call.
    Created,
    /// The collection was already present and left untouched.
    AlreadyExists,
}

/// Result of a batch operation for a single item.
///
/// Items are identified by their zero-based position in the submitted batch,
/// since the backend assigns document ids on insert.
#[derive(Debug, Clone)]
pub struct BatchOperationResult {
    /// Position of the document in the submitted batch.
    pub position: usize,
    /// Backend-assigned id, when the backend reported one.
    pub document_id: Option<String>,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error if the operation failed.
    pub error: Option<SearchIndexError>,
}

/// Summary of a batch operation containing aggregate statistics and individual results.
///
/// `succeeded + failed == total` always holds.
#[derive(Debug, Clone, Default)]
pub struct BatchOperationSummary {
    /// Total number of items in the batch.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each item.
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a summary from per-item results.
    pub fn from_results(results: Vec<BatchOperationResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }

    /// Mark every item in `range` as failed with the same error.
    pub fn all_failed(positions: std::ops::Range<usize>, error: SearchIndexError) -> Self {
        let results = positions
            .map(|position| BatchOperationResult {
                position,
                document_id: None,
                success: false,
                error: Some(error.clone()),
            })
            .collect();
        Self::from_results(results)
    }

    /// Append another summary, keeping totals consistent.
    pub fn merge(&mut self, other: BatchOperationSummary) {
        self.total += other.total;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.results.extend(other.results);
    }

    /// Results of the items that failed.
    pub fn failures(&self) -> impl Iterator<Item = &BatchOperationResult> {
        self.results.iter().filter(|r| !r.success)
    }
}

/// Outcome of deleting documents by a key field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// No document matched the key.
    NotFound,
    /// Matching documents were deleted.
    Deleted {
        /// Documents removed by this call.
        deleted: usize,
        /// Documents the backend reported as matching.
        matched: u64,
    },
}

impl DeleteOutcome {
    pub fn deleted_count(&self) -> usize {
        match self {
            Self::NotFound => 0,
            Self::Deleted { deleted, .. } => *deleted,
        }
    }

    /// False when more documents matched than were fetched by the lookup.
    pub fn is_complete(&self) -> bool {
        match self {
            Self::NotFound => true,
            Self::Deleted { deleted, matched } => *deleted as u64 >= *matched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(position: usize) -> BatchOperationResult {
        BatchOperationResult {
            position,
            document_id: Some(format!("doc-{}", position)),
            success: true,
            error: None,
        }
    }

    #[test]
    fn test_summary_from_results() {
        let mut results = vec![ok(0), ok(1)];
        results.push(BatchOperationResult {
            position: 2,
            document_id: None,
            success: false,
            error: Some(SearchIndexError::bulk_operation("mapper_parsing_exception")),
        });

        let summary = BatchOperationSummary::from_results(results);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures().next().map(|r| r.position), Some(2));
    }

    #[test]
    fn test_merge_keeps_totals() {
        let mut summary = BatchOperationSummary::from_results(vec![ok(0), ok(1)]);
        summary.merge(BatchOperationSummary::all_failed(
            2..5,
            SearchIndexError::connection("reset"),
        ));

        assert_eq!(summary.total, 5);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 3);
        assert_eq!(summary.succeeded + summary.failed, summary.total);
    }

    #[test]
    fn test_delete_outcome() {
        assert_eq!(DeleteOutcome::NotFound.deleted_count(), 0);
        assert!(DeleteOutcome::NotFound.is_complete());

        let partial = DeleteOutcome::Deleted {
            deleted: 10,
            matched: 12,
        };
        assert_eq!(partial.deleted_count(), 10);
        assert!(!partial.is_complete());
    }
}
