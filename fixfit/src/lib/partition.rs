use crate::utils::*;

/// A fixed-capacity region of memory.
///
/// The [`capacity`](Partition::capacity) is set once, at construction.
/// The [`used`](Partition::used) counter starts at zero and only ever
/// grows, through [`try_allocate`](Partition::try_allocate). There is no
/// way to give memory back: `fixfit` does not model deallocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    id:         String,
    capacity:   KiloBytes,
    used:       KiloBytes,
}

/// A read-only picture of a [`Partition`] at some point of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSnapshot {
    pub id:         String,
    pub capacity:   KiloBytes,
    pub used:       KiloBytes,
    pub free:       KiloBytes,
}

impl Partition {
    pub fn new(id: impl Into<String>, capacity: KiloBytes) -> Result<Self, AllocError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(AllocError::invalid("partition with empty id"));
        }
        if capacity == 0 {
            return Err(AllocError::invalid(format!("partition {} has zero capacity", id)));
        }

        Ok(Self {
            id,
            capacity,
            used: 0,
        })
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn capacity(&self) -> KiloBytes {
        self.capacity
    }

    #[inline]
    pub fn used(&self) -> KiloBytes {
        self.used
    }

    #[inline]
    pub fn free(&self) -> KiloBytes {
        self.capacity - self.used
    }

    /// Returns `true` if `size` more kilobytes fit here.
    ///
    /// Zero-sized requests are meaningless and get rejected.
    pub fn has_room_for(&self, size: KiloBytes) -> Result<bool, AllocError> {
        if size == 0 {
            return Err(AllocError::invalid("requested size must be positive"));
        }

        Ok(self.free() >= size)
    }

    /// The one and only mutator. Either the whole of `size` is
    /// accounted for and `true` comes back, or nothing changes.
    pub fn try_allocate(&mut self, size: KiloBytes) -> Result<bool, AllocError> {
        if self.has_room_for(size)? {
            self.used += size;
            debug_assert!(self.used <= self.capacity);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn describe(&self) -> String {
        self.to_string()
    }

    pub fn snapshot(&self) -> PartitionSnapshot {
        PartitionSnapshot {
            id:         self.id.clone(),
            capacity:   self.capacity,
            used:       self.used,
            free:       self.free(),
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Partition {}: {}KB, Used: {}KB, Free: {}KB",
            self.id,
            self.capacity,
            self.used,
            self.free()
        )
    }
}
