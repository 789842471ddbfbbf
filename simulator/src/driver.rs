use std::collections::VecDeque;

use vm::{
    error::{PageTableError, Result},
    operating_system::{OperatingSystem, ReplacementPolicy},
    page_table::{PageTable, PageTableEntry},
};

/// The operating system as seen by a page table: a fixed policy and a log
/// backed trace.
pub struct SimulatedOs {
    policy: ReplacementPolicy,
}

impl SimulatedOs {
    pub fn new(policy: ReplacementPolicy) -> Self {
        SimulatedOs { policy }
    }
}

impl OperatingSystem for SimulatedOs {
    fn replacement_policy(&self) -> ReplacementPolicy {
        self.policy
    }

    fn diagnostic(&self, message: &str) {
        log::info!("{}", message);
    }
}

#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub struct Stats {
    pub accesses: usize,
    pub page_faults: usize,
    pub evictions: usize,
    pub write_backs: usize,
}

/// A process with a fixed budget of RAM frames and a bounded address space
/// of `page_count` pages.
pub struct Process {
    page_table: PageTable,
    page_count: usize,
    free_frames: VecDeque<usize>,
    stats: Stats,
}

impl Process {
    /// Frames beyond `page_count` could never be filled and are not handed
    /// out.
    pub fn new(pid: usize, frame_count: usize, page_count: usize, seed: Option<u64>) -> Self {
        let page_table = match seed {
            Some(seed) => PageTable::with_seed(pid, seed),
            None => PageTable::new(pid),
        };

        Process {
            page_table,
            page_count,
            free_frames: (0..frame_count.min(page_count)).collect(),
            stats: Stats::default(),
        }
    }

    pub fn page_table(&self) -> &PageTable {
        &self.page_table
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Accesses page `vpn`, faulting it in if needed. Returns the frame that
    /// now holds it. Pages outside the address space are `UnknownPage`.
    pub fn access<O: OperatingSystem>(&mut self, os: &O, vpn: usize, write: bool) -> Result<usize> {
        if vpn >= self.page_count {
            return Err(PageTableError::UnknownPage(vpn));
        }

        // pages get an entry the first time they are referenced
        while self.page_table.size() <= vpn {
            self.page_table.append(PageTableEntry::new());
        }

        let entry = *self
            .page_table
            .lookup(vpn)
            .ok_or(PageTableError::UnknownPage(vpn))?;

        let frame_idx = if entry.valid {
            log::debug!("pid {}: page {:#06X} hit", self.page_table.pid(), vpn);
            entry.frame_index
        } else {
            log::debug!("pid {}: page fault on {:#06X}", self.page_table.pid(), vpn);
            self.handle_page_fault(os, vpn)?
        };

        self.page_table.touch(vpn, write)?;
        self.stats.accesses += 1;

        Ok(frame_idx)
    }

    fn handle_page_fault<O: OperatingSystem>(&mut self, os: &O, vpn: usize) -> Result<usize> {
        let frame_idx = match self.free_frames.pop_front() {
            Some(empty_idx) => {
                self.page_table.mark_resident(vpn)?;
                empty_idx
            }
            None => {
                let victim = self.page_table.select_next_resident_and_replace(os, vpn)?;
                self.stats.evictions += 1;

                let evicted = self
                    .page_table
                    .lookup_mut(victim)
                    .ok_or(PageTableError::UnknownPage(victim))?;

                evicted.valid = false;
                if evicted.dirty {
                    log::debug!("page {:#06X} is dirty, writing it back before reuse", victim);
                    evicted.dirty = false;
                    self.stats.write_backs += 1;
                }

                evicted.frame_index
            }
        };

        let entry = self
            .page_table
            .lookup_mut(vpn)
            .ok_or(PageTableError::UnknownPage(vpn))?;
        entry.valid = true;
        entry.frame_index = frame_idx;
        self.stats.page_faults += 1;

        Ok(frame_idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BELADY_REFERENCES;

    const PAGES: usize = 16;

    fn run(policy: ReplacementPolicy, frames: usize, references: &[usize]) -> Process {
        let os = SimulatedOs::new(policy);
        let mut process = Process::new(1, frames, PAGES, Some(5));

        for &vpn in references {
            process.access(&os, vpn, false).unwrap();
        }
        process
    }

    #[test]
    fn test_belady_anomaly_under_fifo() {
        let three = run(ReplacementPolicy::Fifo, 3, &BELADY_REFERENCES);
        let four = run(ReplacementPolicy::Fifo, 4, &BELADY_REFERENCES);

        assert_eq!(three.stats().page_faults, 9);
        assert_eq!(four.stats().page_faults, 10);
        assert_eq!(three.stats().evictions, 6);
    }

    #[test]
    fn test_clock_keeps_recently_used_page() {
        let clock = run(ReplacementPolicy::Clock, 3, &[0, 1, 2, 3, 1, 4]);
        let fifo = run(ReplacementPolicy::Fifo, 3, &[0, 1, 2, 3, 1, 4]);

        let table = clock.page_table();
        assert!(table.lookup(1).unwrap().valid);
        assert!(!table.lookup(2).unwrap().valid);

        assert!(!fifo.page_table().lookup(1).unwrap().valid);
    }

    #[test]
    fn test_resident_set_matches_frame_budget() {
        for policy in [ReplacementPolicy::Clock, ReplacementPolicy::Fifo, ReplacementPolicy::Random] {
            let process = run(policy, 3, &[0, 4, 2, 7, 0, 1, 4, 3, 3, 6, 5, 2]);
            let table = process.page_table();

            assert_eq!(table.size(), 8);
            assert_eq!(table.resident_count(), 3);
            for vpn in table.resident_pages() {
                assert!(table.lookup(vpn).unwrap().valid);
            }

            let mut frames: Vec<usize> = table
                .resident_pages()
                .map(|vpn| table.lookup(vpn).unwrap().frame_index)
                .collect();
            frames.sort();
            assert_eq!(frames, vec![0, 1, 2]);
        }
    }

    #[test]
    fn test_hit_returns_same_frame() {
        let os = SimulatedOs::new(ReplacementPolicy::Fifo);
        let mut process = Process::new(1, 2, PAGES, None);

        let frame = process.access(&os, 3, false).unwrap();
        assert_eq!(process.access(&os, 3, false), Ok(frame));
        assert_eq!(process.stats().page_faults, 1);
        assert_eq!(process.stats().accesses, 2);
    }

    #[test]
    fn test_dirty_victim_is_written_back() {
        let os = SimulatedOs::new(ReplacementPolicy::Fifo);
        let mut process = Process::new(1, 1, PAGES, None);

        process.access(&os, 0, true).unwrap();
        process.access(&os, 1, false).unwrap();
        process.access(&os, 0, false).unwrap();

        let stats = process.stats();
        assert_eq!(stats.write_backs, 1);
        assert_eq!(stats.evictions, 2);
        assert!(!process.page_table().lookup(0).unwrap().dirty);
    }

    #[test]
    fn test_no_frames_is_an_error() {
        let os = SimulatedOs::new(ReplacementPolicy::Clock);
        let mut process = Process::new(1, 0, PAGES, None);

        assert_eq!(process.access(&os, 0, false), Err(PageTableError::EmptyResidentSet));

        // the fault never completed
        assert_eq!(process.stats(), Stats::default());
        assert!(!process.page_table().lookup(0).unwrap().valid);
    }

    #[test]
    fn test_access_outside_address_space() {
        let os = SimulatedOs::new(ReplacementPolicy::Fifo);
        let mut process = Process::new(1, 2, PAGES, None);

        assert_eq!(process.access(&os, PAGES, false), Err(PageTableError::UnknownPage(PAGES)));
        assert_eq!(
            process.access(&os, 1usize << 40, false),
            Err(PageTableError::UnknownPage(1usize << 40))
        );
        assert_eq!(
            process.access(&os, usize::MAX, true),
            Err(PageTableError::UnknownPage(usize::MAX))
        );

        assert_eq!(process.page_table().size(), 0);
        assert_eq!(process.stats(), Stats::default());

        assert!(process.access(&os, PAGES - 1, false).is_ok());
        assert_eq!(process.page_table().size(), PAGES);
    }

    #[test]
    fn test_frames_beyond_page_count_are_not_used() {
        let os = SimulatedOs::new(ReplacementPolicy::Fifo);
        let mut process = Process::new(1, usize::MAX, 2, None);

        assert_eq!(process.access(&os, 0, false), Ok(0));
        assert_eq!(process.access(&os, 1, false), Ok(1));
        assert_eq!(process.page_table().resident_count(), 2);
        assert_eq!(process.page_count(), 2);
    }
}
