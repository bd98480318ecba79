//! Welcome to `fixfit`!
//!
//! A small simulation of fixed-partition memory allocation. A handful
//! of [`Partition`]s of predetermined sizes receive a stream of [`Job`]s;
//! the [`Allocator`] places each job in the **first** partition that has
//! enough free space, and reports what it did.
//!
//! Partitions never shrink, split, or give memory back. A job that fits
//! nowhere is simply turned down ([`Verdict::NoFit`]) and the next one is
//! served.
//!
//! ```
//! use fixfit::*;
//!
//! let mut alloc = Allocator::from_layout(&reference_layout()).unwrap();
//! let placed = alloc.allocate(&Job::new(1, 4500).unwrap()).unwrap();
//! assert_eq!(placed.partition(), Some("P2"));
//! ```

mod partition;
mod allocator;
mod job;
pub mod sim;
pub mod render;

/// Imports, type aliases, error types ... in general
/// useful stuff that shall be needed in many places.
mod utils;

pub use crate::utils::{AllocError, JobId, KiloBytes, SourceError};
pub use crate::partition::{Partition, PartitionSnapshot};
pub use crate::allocator::{Allocator, Placement, Skip, Verdict};
pub use crate::job::{
    reference_layout, CsvJobs, ExplicitSizes, Job, JobGen, PartitionSpec, UniformSizes,
    REFERENCE_JOBS, REFERENCE_MAX, REFERENCE_MIN,
};
pub use crate::sim::{RunLog, Simulation, Step, Summary};
