use crate::utils::*;

/// The outcome of one job, plus how every partition looked right after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub placement:  Placement,
    pub after:      Vec<PartitionSnapshot>,
}

/// A whole run: the layout it started from and one [`Step`] per job,
/// in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLog {
    pub layout: Vec<PartitionSnapshot>,
    pub steps:  Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub placed:         usize,
    pub rejected:       usize,
    pub total_used:     KiloBytes,
    pub total_capacity: KiloBytes,
    /// Percentage of the total capacity handed out to jobs.
    pub utilization:    f64,
}

impl RunLog {
    pub fn jobs(&self) -> impl Iterator<Item = &Job> + '_ {
        self.steps
            .iter()
            .map(|s| &s.placement.job)
    }

    pub fn summary(&self) -> Summary {
        let (placed, rejected) = self.steps
            .iter()
            .fold((0, 0), |(p, r), s| {
                if s.placement.is_placed() { (p + 1, r) } else { (p, r + 1) }
            });
        let last = self.steps
            .last()
            .map(|s| &s.after)
            .unwrap_or(&self.layout);
        // Logs may come from anywhere (e.g. JSON); saturate rather than wrap.
        let total_used = last.iter().map(|p| p.used).fold(0, KiloBytes::saturating_add);
        let total_capacity = last.iter().map(|p| p.capacity).fold(0, KiloBytes::saturating_add);

        Summary {
            placed,
            rejected,
            total_used,
            total_capacity,
            utilization: if total_capacity == 0 { 0.0 } else {
                total_used as f64 / total_capacity as f64 * 100.0
            },
        }
    }
}

/// Feeds jobs to an [`Allocator`], one at a time, and records what
/// happened. A job that fits nowhere does not stop the run.
pub struct Simulation {
    allocator:  Allocator,
    log:        RunLog,
}

impl Simulation {
    pub fn new(allocator: Allocator) -> Self {
        let layout = allocator.snapshots();
        Self {
            allocator,
            log: RunLog { layout, steps: vec![] },
        }
    }

    pub fn step(&mut self, job: &Job) -> Result<&Step, AllocError> {
        let placement = self.allocator.allocate(job)?;
        self.log.steps.push(Step {
            placement,
            after: self.allocator.snapshots(),
        });

        // Just pushed.
        Ok(&self.log.steps[self.log.steps.len() - 1])
    }

    pub fn run<'a, I>(mut self, jobs: I) -> Result<RunLog, AllocError>
    where I: IntoIterator<Item = &'a Job> {
        for j in jobs {
            self.step(j)?;
        }

        Ok(self.log)
    }

    #[inline]
    pub fn allocator(&self) -> &Allocator {
        &self.allocator
    }

    #[inline]
    pub fn log(&self) -> &RunLog {
        &self.log
    }

    pub fn into_log(self) -> RunLog {
        self.log
    }
}
