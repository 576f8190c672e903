//! Reconciliation: merge a fresh extraction with prior persisted state.
//!
//! The merge is asymmetric on purpose. A fresh non-null value replaces
//! the existing one; a fresh null never erases existing data, because
//! extraction absence is not evidence of true absence. Repeated runs
//! against a noisy source can only hold or improve a record's
//! informational content.

use tracing::debug;

use crate::types::record::{LoanDraw, LoanRecord};

/// Merge `fresh` onto `existing`, preferring non-null values.
///
/// Pure and total: no input combination fails. The pipeline-owned
/// provenance fields (`source_link`, `extracted_at`) always take the
/// fresh value; the fresh record is stamped on both the real-extraction
/// and short-circuit paths, so they reflect the latest fetch attempt.
pub fn reconcile(existing: Option<&LoanRecord>, fresh: LoanRecord) -> LoanRecord {
    let Some(existing) = existing else {
        return fresh;
    };

    debug!(
        business = %fresh.business_name,
        fresh_has_data = fresh.has_loan_data(),
        existing_has_data = existing.has_loan_data(),
        "reconciling with prior record"
    );

    LoanRecord {
        business_name: if fresh.business_name.trim().is_empty() {
            existing.business_name.clone()
        } else {
            fresh.business_name
        },
        source_link: fresh.source_link,
        extracted_at: fresh.extracted_at,
        first_draw: merge_draw(&existing.first_draw, fresh.first_draw),
        second_draw: merge_draw(&existing.second_draw, fresh.second_draw),
        lender: fresh.lender.or_else(|| existing.lender.clone()),
        notes: fresh.notes.or_else(|| existing.notes.clone()),
    }
}

fn merge_draw(existing: &LoanDraw, fresh: LoanDraw) -> LoanDraw {
    LoanDraw {
        amount: fresh.amount.or(existing.amount),
        date: fresh.date.or(existing.date),
        forgiveness: fresh.forgiveness.or(existing.forgiveness),
    }
}
