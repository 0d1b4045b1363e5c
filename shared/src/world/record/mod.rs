pub mod diff_mask;
pub mod error;
pub mod record_mutator;
pub mod replication_record;
