//! Storage implementations for the submission-store seam.

pub mod memory;

pub use memory::MemorySubmissionStore;
