pub use std::path::PathBuf;
use std::collections::HashSet;
use std::ops::RangeInclusive;
use fixfit::{
    Allocator, Job, JobGen, KiloBytes, PartitionSnapshot, PartitionSpec,
    RunLog, Simulation, SourceError, UniformSizes, Verdict,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// First-Fit, written as plainly as possible and sharing no code with
/// `fixfit`'s allocator: the first slot whose free space covers `size`.
pub fn reference_first_fit(free: &[KiloBytes], size: KiloBytes) -> Option<usize> {
    free.iter().position(|f| *f >= size)
}

/// Plays `sizes` through [`reference_first_fit`] over partitions of the
/// given capacities. Returns, per job, the index it should land on.
pub fn replay(capacities: &[KiloBytes], sizes: &[KiloBytes]) -> Vec<Option<usize>> {
    let mut free = capacities.to_vec();
    sizes.iter()
        .map(|s| {
            let hit = reference_first_fit(&free, *s);
            if let Some(idx) = hit {
                free[idx] -= s;
            }
            hit
        })
        .collect()
}

/// What a [`RunLog`] got wrong, if anything. `step` counts from 0.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Discrepancy {
    #[error("log has no partitions")]
    EmptyLayout,
    #[error("layout cannot come from an allocator: {0}")]
    InvalidLayout(String),
    #[error("step {step}: job {job} went to {got:?}, First-Fit says {expected:?}")]
    WrongPartition {
        step:       usize,
        job:        u32,
        expected:   Option<usize>,
        got:        Option<usize>,
    },
    #[error("step {step}: skipped partitions reported as {got:?}, expected {expected:?}")]
    WrongSkips {
        step:       usize,
        expected:   Vec<(String, KiloBytes)>,
        got:        Vec<(String, KiloBytes)>,
    },
    #[error("step {step}: partition {partition} reports {got:?} (capacity, used, free), expected {expected:?}")]
    WrongUsage {
        step:       usize,
        partition:  String,
        expected:   (KiloBytes, KiloBytes, KiloBytes),
        got:        (KiloBytes, KiloBytes, KiloBytes),
    },
    #[error("step {step}: expected {expected} partitions, got {got}")]
    WrongShape {
        step:       usize,
        expected:   usize,
        got:        usize,
    },
}

// Our own bookkeeping for one partition while checking a log.
#[derive(Clone)]
struct Shadow {
    id:         String,
    capacity:   KiloBytes,
    used:       KiloBytes,
}

impl Shadow {
    fn free(&self) -> KiloBytes {
        self.capacity - self.used
    }

    fn triple(&self) -> (KiloBytes, KiloBytes, KiloBytes) {
        (self.capacity, self.used, self.free())
    }
}

fn triple(s: &PartitionSnapshot) -> (KiloBytes, KiloBytes, KiloBytes) {
    (s.capacity, s.used, s.free)
}

fn check_snapshots(step: usize, shadow: &[Shadow], got: &[PartitionSnapshot]) -> Result<(), Discrepancy> {
    if shadow.len() != got.len() {
        return Err(Discrepancy::WrongShape { step, expected: shadow.len(), got: got.len() });
    }
    for (s, g) in shadow.iter().zip(got) {
        if s.id != g.id || s.triple() != triple(g) {
            return Err(Discrepancy::WrongUsage {
                step,
                partition:  g.id.clone(),
                expected:   s.triple(),
                got:        triple(g),
            });
        }
    }

    Ok(())
}

/// Replays a whole [`RunLog`] against the reference rule, starting from
/// its recorded layout. Every step's verdict, skip list and resulting
/// usage must match. Usage bounds and monotonicity follow, since the
/// shadow partitions only ever grow and never overflow.
pub fn verify_log(log: &RunLog) -> Result<(), Discrepancy> {
    if log.layout.is_empty() {
        return Err(Discrepancy::EmptyLayout);
    }
    let mut shadow: Vec<Shadow> = log.layout
        .iter()
        .map(|s| Shadow { id: s.id.clone(), capacity: s.capacity, used: s.used })
        .collect();
    // Only layouts an `Allocator` accepts are worth replaying.
    let mut seen = HashSet::new();
    let mut total: KiloBytes = 0;
    for s in &log.layout {
        if s.id.trim().is_empty() || s.capacity == 0 {
            return Err(Discrepancy::InvalidLayout(format!("partition {:?} of capacity {}", s.id, s.capacity)));
        }
        if !seen.insert(s.id.as_str()) {
            return Err(Discrepancy::InvalidLayout(format!("duplicate partition id {}", s.id)));
        }
        total = total.checked_add(s.capacity)
            .ok_or_else(|| Discrepancy::InvalidLayout(String::from("total capacity overflows")))?;
    }
    // The starting picture must be self-consistent too.
    for s in &log.layout {
        if s.used > s.capacity || s.free != s.capacity - s.used {
            return Err(Discrepancy::WrongUsage {
                step:       0,
                partition:  s.id.clone(),
                expected:   (s.capacity, s.used, s.capacity.saturating_sub(s.used)),
                got:        triple(s),
            });
        }
    }

    for (step, st) in log.steps.iter().enumerate() {
        let job = &st.placement.job;
        let free: Vec<KiloBytes> = shadow.iter().map(Shadow::free).collect();
        let expected = reference_first_fit(&free, job.size());
        let got = match &st.placement.verdict {
            Verdict::Placed { index, partition }    => {
                // An index pointing at a differently named partition is as
                // wrong as a wrong index.
                match shadow.get(*index) {
                    Some(s) if s.id == *partition   => { Some(*index) },
                    _                               => { Some(usize::MAX) }
                }
            },
            Verdict::NoFit                          => { None }
        };
        if got != expected {
            return Err(Discrepancy::WrongPartition { step, job: job.id(), expected, got });
        }

        let expected_skips: Vec<(String, KiloBytes)> = shadow[..expected.unwrap_or(shadow.len())]
            .iter()
            .map(|s| (s.id.clone(), s.free()))
            .collect();
        let got_skips: Vec<(String, KiloBytes)> = st.placement.skipped
            .iter()
            .map(|s| (s.partition.clone(), s.free))
            .collect();
        if expected_skips != got_skips {
            return Err(Discrepancy::WrongSkips { step, expected: expected_skips, got: got_skips });
        }

        if let Some(idx) = expected {
            shadow[idx].used += job.size();
        }
        check_snapshots(step, &shadow, &st.after)?;
    }

    Ok(())
}

/// Aggregate outcome of many verified runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub runs:               usize,
    pub verified:           usize,
    pub jobs_placed:        usize,
    pub jobs_rejected:      usize,
    pub mean_utilization:   f64,
    /// Seed and reason for every run that did not verify.
    pub failures:           Vec<(u64, String)>,
}

/// Outcome of a single seeded run, as fed into [`SweepReport::collect`].
pub struct RunOutcome {
    pub seed:       u64,
    pub log:        RunLog,
    pub verdict:    Result<(), Discrepancy>,
}

impl SweepReport {
    pub fn collect(outcomes: Vec<RunOutcome>) -> Self {
        let mut res = SweepReport {
            runs: outcomes.len(),
            ..Default::default()
        };
        let mut util_sum = 0.0;
        for o in outcomes {
            let summary = o.log.summary();
            res.jobs_placed += summary.placed;
            res.jobs_rejected += summary.rejected;
            util_sum += summary.utilization;
            match o.verdict {
                Ok(_)   => { res.verified += 1; },
                Err(e)  => { res.failures.push((o.seed, e.to_string())); }
            }
        }
        if res.runs > 0 {
            res.mean_utilization = util_sum / res.runs as f64;
        }

        res
    }
}

/// Runs `count` uniformly sized jobs, drawn with `seed`, through a fresh
/// allocator over `layout`, then checks the log against the reference rule.
pub fn run_seeded(
    layout: &[PartitionSpec],
    count:  usize,
    range:  RangeInclusive<KiloBytes>,
    seed:   u64,
) -> Result<RunOutcome, SourceError> {
    let jobs = UniformSizes::new(count, range, Some(seed)).read_jobs()?;
    let log = Simulation::new(Allocator::from_layout(layout)?).run(&jobs)?;
    let verdict = verify_log(&log);

    Ok(RunOutcome { seed, log, verdict })
}

/// Sizes of the jobs in `log`, in submission order.
pub fn sizes_of(log: &RunLog) -> Vec<KiloBytes> {
    log.jobs().map(Job::size).collect()
}

pub fn capacities_of(layout: &[PartitionSpec]) -> Vec<KiloBytes> {
    layout.iter().map(|s| s.capacity).collect()
}
