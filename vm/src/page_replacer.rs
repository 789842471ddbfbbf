use std::collections::VecDeque;

use rand::Rng;

use crate::{
    error::{PageTableError, Result},
    operating_system::ReplacementPolicy,
    page_table::PageTableEntry,
};

/// Pages of one process currently held in RAM, by page number.
///
/// New pages always go to the tail. FIFO reads this as insertion order and
/// Clock as the circular order swept by `hand`. Random ignores the order.
#[derive(Debug, Default)]
pub struct ResidentSet {
    order: VecDeque<usize>,
    hand: usize,
}

impl ResidentSet {
    pub fn new() -> Self {
        ResidentSet {
            order: VecDeque::new(),
            hand: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Position of the clock hand. Always 0 while the set is empty.
    pub fn hand(&self) -> usize {
        self.hand
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.order.iter().copied()
    }

    pub(crate) fn push(&mut self, page_number: usize) {
        self.order.push_back(page_number)
    }

    /// Runs `policy` over the set and returns the position of the victim.
    ///
    /// Nothing is removed here. Clock does clear the referenced bits it
    /// sweeps over and leaves the hand on the victim.
    pub fn pick_replacement_page<R: Rng>(
        &mut self,
        policy: ReplacementPolicy,
        entries: &mut [PageTableEntry],
        rng: &mut R,
    ) -> Result<usize> {
        if self.order.is_empty() {
            return Err(PageTableError::EmptyResidentSet);
        }

        let position = match policy {
            ReplacementPolicy::Fifo => 0,
            ReplacementPolicy::Clock => self.sweep_clock(entries)?,
            ReplacementPolicy::Random => rng.gen_range(0..self.order.len()),
        };

        Ok(position)
    }

    /// Second chance: clear and skip referenced pages until an unreferenced
    /// one sits under the hand. At most `len` bits get cleared, so a set of
    /// all-referenced pages ends back where the sweep started.
    fn sweep_clock(&mut self, entries: &mut [PageTableEntry]) -> Result<usize> {
        loop {
            let page_number = self.order[self.hand];
            let entry = entries
                .get_mut(page_number)
                .ok_or(PageTableError::UnknownPage(page_number))?;

            if !entry.referenced {
                return Ok(self.hand);
            }

            log::trace!("clock: giving page {} a second chance", page_number);
            entry.referenced = false;
            self.hand = (self.hand + 1) % self.order.len();
        }
    }

    /// Swaps the page at `position` for `new_page` and returns the page that
    /// left. The newcomer joins at the tail.
    ///
    /// The hand keeps pointing at the same logical page. If that page was the
    /// victim, the hand moves to its successor and wraps to the front when
    /// the victim was last.
    pub(crate) fn replace(&mut self, position: usize, new_page: usize) -> Result<usize> {
        let victim = self
            .order
            .remove(position)
            .ok_or(PageTableError::EmptyResidentSet)?;

        if position < self.hand {
            self.hand -= 1;
        }
        if self.hand >= self.order.len() {
            self.hand = 0;
        }

        self.order.push_back(new_page);

        Ok(victim)
    }
}
