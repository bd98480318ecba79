use crate::utils::*;

/// A partition that was looked at and passed over during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skip {
    pub partition:  String,
    pub free:       KiloBytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Placed {
        /// Position of the partition in scan order.
        index:      usize,
        partition:  String,
    },
    /// Every partition was too full. Nothing was touched.
    NoFit,
}

/// Everything that happened while serving one [`Job`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub job:        Job,
    pub skipped:    Vec<Skip>,
    pub verdict:    Verdict,
}

impl Placement {
    #[inline]
    pub fn is_placed(&self) -> bool {
        matches!(self.verdict, Verdict::Placed { .. })
    }

    pub fn partition(&self) -> Option<&str> {
        match &self.verdict {
            Verdict::Placed { partition, .. }   => { Some(partition) },
            Verdict::NoFit                      => { None }
        }
    }
}

/// First-Fit over a fixed, ordered sequence of [`Partition`]s.
///
/// The order given at construction *is* the scan order, and it never
/// changes. Apart from the partitions' own counters, the allocator
/// keeps no state.
///
/// Serving a job is split in two: [`find_first_fit`](Allocator::find_first_fit)
/// is a pure query, [`commit`](Allocator::commit) does the mutation.
/// [`allocate`](Allocator::allocate) glues them together. Since both
/// `allocate` and `commit` need `&mut self`, nobody can sneak in
/// between the check and the update.
#[derive(Debug, Clone)]
pub struct Allocator {
    partitions: Vec<Partition>,
}

impl Allocator {
    pub fn new(partitions: Vec<Partition>) -> Result<Self, AllocError> {
        if partitions.is_empty() {
            return Err(AllocError::invalid("allocator needs at least one partition"));
        }
        let mut seen = IndexSet::with_capacity(partitions.len());
        for p in &partitions {
            if !seen.insert(p.id()) {
                return Err(AllocError::invalid(format!("duplicate partition id {}", p.id())));
            }
        }

        Ok(Self { partitions })
    }

    pub fn from_layout(layout: &[PartitionSpec]) -> Result<Self, AllocError> {
        Self::new(
            layout.iter()
                .map(|s| Partition::new(s.id.clone(), s.capacity))
                .collect::<Result<Vec<_>, _>>()?
        )
    }

    /// Index of the first partition, in scan order, that can hold
    /// `size`. Touches nothing.
    pub fn find_first_fit(&self, size: KiloBytes) -> Result<Option<usize>, AllocError> {
        for (idx, p) in self.partitions.iter().enumerate() {
            if p.has_room_for(size)? {
                return Ok(Some(idx));
            }
        }

        Ok(None)
    }

    /// Charges `size` to the partition at `index`.
    pub fn commit(&mut self, index: usize, size: KiloBytes) -> Result<(), AllocError> {
        let count = self.partitions.len();
        let p = self.partitions
            .get_mut(index)
            .ok_or_else(|| AllocError::invalid(format!("no partition at index {} ({} total)", index, count)))?;
        if p.try_allocate(size)? {
            Ok(())
        } else {
            Err(AllocError::InsufficientSpace {
                partition:  p.id().to_string(),
                requested:  size,
                free:       p.free(),
            })
        }
    }

    /// Serves `job` First-Fit style: the first partition with enough
    /// room wins, and no alternatives are weighed. Partitions passed
    /// over on the way are reported in [`Placement::skipped`].
    ///
    /// At most one partition is mutated.
    pub fn allocate(&mut self, job: &Job) -> Result<Placement, AllocError> {
        let size = job.size();
        let chosen = self.find_first_fit(size)?;
        // Everything before the chosen partition (or everything, if
        // none was chosen) was skipped.
        let scanned = chosen.unwrap_or(self.partitions.len());
        let skipped: Vec<Skip> = self.partitions[..scanned]
            .iter()
            .map(|p| {
                debug!("Partition {} does not have enough space for Job {} ({}KB).", p.id(), job.id(), size);
                Skip {
                    partition:  p.id().to_string(),
                    free:       p.free(),
                }
            })
            .collect();

        let verdict = match chosen {
            Some(index) => {
                self.commit(index, size)?;
                let partition = self.partitions[index].id().to_string();
                info!("Job {} ({}KB) allocated to {}.", job.id(), size, partition);
                Verdict::Placed { index, partition }
            },
            None        => {
                warn!("Job {} ({}KB) does not fit in any partition.", job.id(), size);
                Verdict::NoFit
            }
        };

        Ok(Placement {
            job: job.clone(),
            skipped,
            verdict,
        })
    }

    pub fn display_all(&self) -> Vec<String> {
        self.partitions
            .iter()
            .map(Partition::describe)
            .collect()
    }

    pub fn snapshots(&self) -> Vec<PartitionSnapshot> {
        self.partitions
            .iter()
            .map(Partition::snapshot)
            .collect()
    }

    #[inline]
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    pub fn partition(&self, id: &str) -> Option<&Partition> {
        self.partitions
            .iter()
            .find(|p| p.id() == id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    /// Never true for a successfully constructed allocator.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn total_capacity(&self) -> KiloBytes {
        self.partitions.iter().map(Partition::capacity).sum()
    }

    pub fn total_used(&self) -> KiloBytes {
        self.partitions.iter().map(Partition::used).sum()
    }

    pub fn total_free(&self) -> KiloBytes {
        self.total_capacity() - self.total_used()
    }
}
