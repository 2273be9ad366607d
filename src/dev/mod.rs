//! Development utilities: synthetic data, bulk population and table clear.

pub mod clear;
pub mod populate;
pub mod synth;

pub use clear::{clear_all, ClearOutcome};
pub use populate::{populate, BulkGenerator, PopulateOutcome, RETRIES_PER_RECORD};
pub use synth::{CustomerSource, SyntheticCustomers, AGE_RANGE};
