use crate::utils::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// How many jobs the reference scenario submits.
pub const REFERENCE_JOBS: usize = 5;
/// Smallest job size of the reference scenario.
pub const REFERENCE_MIN: KiloBytes = 1000;
/// Largest job size of the reference scenario.
pub const REFERENCE_MAX: KiloBytes = 6500;

/// A single allocation request. It lives for exactly one call to
/// [`Allocator::allocate`]; the allocator does not keep it around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawJob")]
pub struct Job {
    id:     JobId,
    size:   KiloBytes,
}

// What a serialized job looks like before `Job::new` has vetted it.
#[derive(Deserialize)]
struct RawJob {
    id:     JobId,
    size:   KiloBytes,
}

impl TryFrom<RawJob> for Job {
    type Error = AllocError;

    fn try_from(raw: RawJob) -> Result<Self, Self::Error> {
        Job::new(raw.id, raw.size)
    }
}

/// Turns a zero-based position into a sequential [`JobId`], refusing
/// runs too long for the id space.
fn nth_id(n: usize) -> Result<JobId, AllocError> {
    n.checked_add(1)
        .and_then(|id| JobId::try_from(id).ok())
        .ok_or_else(|| AllocError::invalid(format!("job at position {} does not fit in a {}-bit id", n, JobId::BITS)))
}

impl Job {
    pub fn new(id: JobId, size: KiloBytes) -> Result<Self, AllocError> {
        if size == 0 {
            return Err(AllocError::invalid(format!("job {} requests zero kilobytes", id)));
        }

        Ok(Self { id, size })
    }

    #[inline]
    pub fn id(&self) -> JobId {
        self.id
    }

    #[inline]
    pub fn size(&self) -> KiloBytes {
        self.size
    }
}

/// Defines the interface for producing jobs.
///
/// The allocator itself never draws random numbers; whoever drives it
/// picks a [`JobGen`] and hands the resulting jobs over as plain data.
pub trait JobGen {
    fn read_jobs(&mut self) -> Result<Vec<Job>, SourceError>;
}

/// Draws `count` sizes uniformly from an inclusive range.
///
/// With a `seed` the draw is reproducible; without one, the generator
/// is seeded from OS entropy.
pub struct UniformSizes {
    pub count:  usize,
    pub range:  RangeInclusive<KiloBytes>,
    pub seed:   Option<u64>,
}

impl UniformSizes {
    pub fn new(count: usize, range: RangeInclusive<KiloBytes>, seed: Option<u64>) -> Self {
        Self { count, range, seed }
    }

    pub fn reference(seed: Option<u64>) -> Self {
        Self::new(REFERENCE_JOBS, REFERENCE_MIN..=REFERENCE_MAX, seed)
    }
}

impl JobGen for UniformSizes {
    fn read_jobs(&mut self) -> Result<Vec<Job>, SourceError> {
        if *self.range.start() == 0 || self.range.is_empty() {
            return Err(AllocError::invalid(format!(
                "bad size range {}..={}",
                self.range.start(),
                self.range.end()
            )).into());
        }
        // Ids run 1..=count, so the last one must be representable.
        if self.count > 0 {
            nth_id(self.count - 1)?;
        }
        let mut rng = match self.seed {
            Some(s) => { StdRng::seed_from_u64(s) },
            None    => { StdRng::from_entropy() }
        };

        (0..self.count)
            .map(|n| nth_id(n).and_then(|id| Job::new(id, rng.gen_range(self.range.clone()))))
            .collect::<Result<Vec<_>, AllocError>>()
            .map_err(SourceError::from)
    }
}

/// A fixed list of sizes. Ids are handed out sequentially from 1.
pub struct ExplicitSizes(pub Vec<KiloBytes>);

impl JobGen for ExplicitSizes {
    fn read_jobs(&mut self) -> Result<Vec<Job>, SourceError> {
        self.0
            .iter()
            .enumerate()
            .map(|(n, size)| nth_id(n).and_then(|id| Job::new(id, *size)))
            .collect::<Result<Vec<_>, AllocError>>()
            .map_err(SourceError::from)
    }
}

/// Reads `id,size` pairs off a CSV file. The first line is a header.
/// Jobs are submitted in file order.
pub struct CsvJobs {
    pub path: PathBuf,
}

impl CsvJobs {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl JobGen for CsvJobs {
    fn read_jobs(&mut self) -> Result<Vec<Job>, SourceError> {
        let reader = BufReader::new(std::fs::File::open(&self.path)?);
        let mut res = vec![];
        let mut seen = IndexSet::new();
        for (idx, line) in reader.lines()
            .enumerate()
            // First line is the header!
            .skip(1) {
            let line = line?;
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }
            let malformed = |message: String| SourceError::Malformed { line: line_no, message };
            let (id, size) = line.split(',')
                .map(str::trim)
                .collect_tuple()
                .ok_or_else(|| malformed(format!("expected 2 columns, got {:?}", line)))?;
            let id: JobId = id.parse()
                .map_err(|e| malformed(format!("bad job id {:?}: {}", id, e)))?;
            let size: KiloBytes = size.parse()
                .map_err(|e| malformed(format!("bad job size {:?}: {}", size, e)))?;
            if !seen.insert(id) {
                return Err(SourceError::DuplicateJob(id));
            }
            res.push(Job::new(id, size)?);
        }

        Ok(res)
    }
}

/// One entry of a partition layout, written `ID=CAPACITY` on the
/// command line (e.g. `P1=3000`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSpec {
    pub id:         String,
    pub capacity:   KiloBytes,
}

impl PartitionSpec {
    pub fn new(id: impl Into<String>, capacity: KiloBytes) -> Self {
        Self { id: id.into(), capacity }
    }
}

impl FromStr for PartitionSpec {
    type Err = AllocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, cap) = s.split_once('=')
            .ok_or_else(|| AllocError::invalid(format!("expected ID=CAPACITY, got {:?}", s)))?;
        let capacity = cap.trim()
            .parse::<KiloBytes>()
            .map_err(|e| AllocError::invalid(format!("bad capacity {:?}: {}", cap, e)))?;

        Ok(Self::new(id.trim(), capacity))
    }
}

/// P1 through P5, as used throughout the documentation and tests.
pub fn reference_layout() -> Vec<PartitionSpec> {
    vec![
        PartitionSpec::new("P1", 3000),
        PartitionSpec::new("P2", 5000),
        PartitionSpec::new("P3", 4000),
        PartitionSpec::new("P4", 6000),
        PartitionSpec::new("P5", 7000),
    ]
}
