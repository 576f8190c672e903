//! Store trait for the persistence collaborator.
//!
//! The pipeline never persists: it loads prior state through this seam
//! before a run and hands the reconciled record back to the caller, who
//! saves it after a successful run. Two concurrent runs for the same
//! submission may race; the last writer wins, and any serialization is
//! the caller's responsibility.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::record::LoanRecord;

/// Per-submission document store, keyed by an opaque submission id.
///
/// The loan record is embedded under a loan-data field of a larger
/// per-submission document; that document's other fields are not this
/// crate's concern.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn load_loan_record(&self, submission_id: &str)
        -> Result<Option<LoanRecord>, StoreError>;

    async fn save_loan_record(
        &self,
        submission_id: &str,
        record: &LoanRecord,
    ) -> Result<(), StoreError>;
}
