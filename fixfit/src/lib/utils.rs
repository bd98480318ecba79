pub use std::{
    fmt,
    io::{BufRead, BufReader},
    ops::RangeInclusive,
    path::PathBuf,
    str::FromStr,
};
pub use thiserror::Error;
pub use itertools::Itertools;
pub use indexmap::IndexSet;
pub use log::{debug, info, warn};
pub use serde::{Deserialize, Serialize};

pub use crate::{
    partition::*,
    allocator::*,
    job::*,
};

/// The unit every size in `fixfit` is measured in. Partitions and
/// jobs alike are expressed in kilobytes; there is no finer grain.
pub type KiloBytes = usize;

/// Sequential job identifier. The first job of a run is `1`.
pub type JobId = u32;

/// Things that can go wrong while *talking* to the allocator.
///
/// A job that fits nowhere is **not** one of them: that is a regular
/// [`Verdict::NoFit`](crate::Verdict::NoFit) and the run goes on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("partition {partition} cannot hold {requested}KB ({free}KB free)")]
    InsufficientSpace {
        partition:  String,
        requested:  KiloBytes,
        free:       KiloBytes,
    },
}

impl AllocError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        AllocError::InvalidArgument(msg.into())
    }
}

/// Appears while reading jobs out of some [`JobGen`].
#[derive(Error, Debug)]
pub enum SourceError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Malformed {
        line:       usize,
        message:    String,
    },
    #[error("job {0} appears more than once")]
    DuplicateJob(JobId),
    #[error(transparent)]
    Alloc(#[from] AllocError),
}
