//! `colstats` computes an aggregate statistic (sum or average) over one
//! numeric column across one or more CSV files, processing files concurrently
//! and merging results deterministically.
//!
//! The primary entrypoint is [`pipeline::run`]: a bounded pool of worker
//! threads reads files in parallel, each file's designated column is parsed
//! into `f64` values, per-file sequences are merged by a single orchestrator
//! thread, and the selected reduction is applied once all input is accounted
//! for. The first error from any worker terminates the run with no output.
//!
//! ## Quick example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use colstats::pipeline::{run, RunOptions};
//!
//! # fn main() -> Result<(), colstats::StatsError> {
//! let files = vec![PathBuf::from("jan.csv"), PathBuf::from("feb.csv")];
//! let mut out = Vec::new();
//! // Average of the 3rd column across both files, e.g. "227.6\n".
//! run(&files, "avg", 3, &mut out, &RunOptions::default())?;
//! # Ok(())
//! # }
//! ```
//!
//! The reducers are also usable on their own:
//!
//! ```rust
//! use colstats::stats::{Operation, sum};
//!
//! assert_eq!(sum(&[236.0, 220.0, 226.0, 218.0, 238.0]), 1138.0);
//! let op: Operation = "avg".parse().unwrap();
//! assert_eq!(op.apply(&[236.0, 220.0, 226.0, 218.0, 238.0]), 227.6);
//! ```
//!
//! ## Modules
//!
//! - [`pipeline`]: the concurrent worker-pool orchestrator and its observer
//!   hooks
//! - [`column`]: per-file CSV column extraction
//! - [`stats`]: the closed set of reductions (`sum`, `avg`)
//! - [`error`]: the error taxonomy shared across the crate
//!
//! ## Error policy
//!
//! All errors are fatal to the whole run — no partial output, no retry, no
//! skipping of bad rows or files. Validation errors (empty file list, zero
//! column, unknown operation) are raised before any file I/O begins, so they
//! never race with worker errors.

pub mod column;
pub mod error;
pub mod pipeline;
pub mod stats;

pub use error::{StatsError, StatsResult};
