//! Per-thread tallies of buffer lifecycle activity. [ByteString] reports every
//! allocation, release, duplication, and transfer through the `record_*` entry
//! points; callers measure the cost of a region of code by capturing a
//! [Snapshot] before and after it and taking the [difference](Snapshot::since).
//!
//! The counters are thread local so concurrently running tests cannot observe
//! each other's activity.
//!
//! [ByteString]: crate::byte_string::ByteString

use std::{cell::Cell, fmt};

/// A point-in-time capture of the current thread's counters. All fields are
/// monotonic totals since the thread started.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub allocations: usize,
    pub allocated_bytes: usize,
    pub releases: usize,
    pub released_bytes: usize,
    pub duplications: usize,
    pub transfers: usize,
}

thread_local! {
    static TALLY: Cell<Snapshot> = Cell::new(Snapshot::default());
}

impl Snapshot {
    /// Field-wise difference between this capture and an `earlier` one.
    pub fn since(&self, earlier: &Self) -> Self {
        Self {
            allocations: self.allocations - earlier.allocations,
            allocated_bytes: self.allocated_bytes - earlier.allocated_bytes,
            releases: self.releases - earlier.releases,
            released_bytes: self.released_bytes - earlier.released_bytes,
            duplications: self.duplications - earlier.duplications,
            transfers: self.transfers - earlier.transfers,
        }
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} allocation(s) of {} byte(s), {} release(s) of {} byte(s), {} duplication(s), {} transfer(s)",
            self.allocations,
            self.allocated_bytes,
            self.releases,
            self.released_bytes,
            self.duplications,
            self.transfers,
        )
    }
}

/// Captures the current thread's counters.
pub fn snapshot() -> Snapshot {
    TALLY.with(Cell::get)
}

fn record(update: impl FnOnce(&mut Snapshot)) {
    TALLY.with(|tally| {
        let mut totals = tally.get();
        update(&mut totals);
        tally.set(totals);
    });
}

pub fn record_allocation(size: usize) {
    record(|totals| {
        totals.allocations += 1;
        totals.allocated_bytes += size;
    });
}

pub fn record_release(size: usize) {
    record(|totals| {
        totals.releases += 1;
        totals.released_bytes += size;
    });
}

pub fn record_duplication() {
    record(|totals| totals.duplications += 1);
}

pub fn record_transfer() {
    record(|totals| totals.transfers += 1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn since_is_field_wise_subtraction() {
        let earlier = Snapshot {
            allocations: 2,
            allocated_bytes: 16,
            releases: 1,
            released_bytes: 8,
            duplications: 1,
            transfers: 0,
        };
        let later = Snapshot {
            allocations: 5,
            allocated_bytes: 48,
            releases: 3,
            released_bytes: 24,
            duplications: 2,
            transfers: 4,
        };
        let delta = later.since(&earlier);
        assert_eq!(3, delta.allocations);
        assert_eq!(32, delta.allocated_bytes);
        assert_eq!(2, delta.releases);
        assert_eq!(16, delta.released_bytes);
        assert_eq!(1, delta.duplications);
        assert_eq!(4, delta.transfers);
    }

    #[test]
    fn recording_bumps_the_current_thread() {
        let before = snapshot();
        record_allocation(8);
        record_release(8);
        record_duplication();
        record_transfer();
        let delta = snapshot().since(&before);
        assert_eq!(1, delta.allocations);
        assert_eq!(8, delta.allocated_bytes);
        assert_eq!(1, delta.releases);
        assert_eq!(8, delta.released_bytes);
        assert_eq!(1, delta.duplications);
        assert_eq!(1, delta.transfers);
    }

    #[test]
    fn activity_is_thread_local() {
        let before = snapshot();
        std::thread::spawn(|| record_allocation(64))
            .join()
            .unwrap();
        assert_eq!(Snapshot::default(), snapshot().since(&before));
    }
}
