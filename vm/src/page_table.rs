use rand::{rngs::StdRng, SeedableRng};

use crate::{
    error::{PageTableError, Result},
    operating_system::OperatingSystem,
    page_replacer::ResidentSet,
};

#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub struct PageTableEntry {
    virt_page_num: usize,
    resident: bool,
    /// Set on access, cleared by the clock sweep.
    pub referenced: bool,
    pub valid: bool,
    pub frame_index: usize,
    pub dirty: bool,
}

impl PageTableEntry {
    pub fn new() -> Self {
        PageTableEntry::default()
    }

    /// Assigned by the page table from the entry's position.
    pub fn virt_page_num(&self) -> usize {
        self.virt_page_num
    }

    pub fn is_resident(&self) -> bool {
        self.resident
    }

    #[cfg(test)]
    pub(crate) fn set_virt_page_num(&mut self, virt_page_num: usize) {
        self.virt_page_num = virt_page_num;
    }
}

/// Page table of a single process.
///
/// Entries are never reordered or removed: the entry at index `i` is always
/// the entry for page `i`, evicted or not.
pub struct PageTable {
    pid: usize,
    entries: Vec<PageTableEntry>,
    resident: ResidentSet,
    rng: StdRng,
}

impl PageTable {
    pub fn new(pid: usize) -> Self {
        PageTable::with_rng(pid, StdRng::from_entropy())
    }

    /// Same as `new`, with a reproducible random replacement sequence.
    pub fn with_seed(pid: usize, seed: u64) -> Self {
        PageTable::with_rng(pid, StdRng::seed_from_u64(seed))
    }

    fn with_rng(pid: usize, rng: StdRng) -> Self {
        PageTable {
            pid,
            entries: Vec::new(),
            resident: ResidentSet::new(),
            rng,
        }
    }

    pub fn pid(&self) -> usize {
        self.pid
    }

    pub fn lookup(&self, vpn: usize) -> Option<&PageTableEntry> {
        self.entries.get(vpn)
    }

    pub fn lookup_mut(&mut self, vpn: usize) -> Option<&mut PageTableEntry> {
        self.entries.get_mut(vpn)
    }

    /// Appends `entry` as the next page and returns its page number.
    pub fn append(&mut self, mut entry: PageTableEntry) -> usize {
        let vpn = self.entries.len();

        entry.virt_page_num = vpn;
        entry.resident = false;
        self.entries.push(entry);

        vpn
    }

    /// Number of entries ever appended, resident or not.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Records an access to `vpn`.
    pub fn touch(&mut self, vpn: usize, write: bool) -> Result<()> {
        let entry = self
            .entries
            .get_mut(vpn)
            .ok_or(PageTableError::UnknownPage(vpn))?;

        entry.referenced = true;
        if write {
            entry.dirty = true;
        }

        Ok(())
    }

    /// Registers `vpn` as occupying a RAM frame.
    pub fn mark_resident(&mut self, vpn: usize) -> Result<()> {
        self.claim_residency(vpn)?;
        self.resident.push(vpn);

        Ok(())
    }

    pub fn resident_count(&self) -> usize {
        self.resident.len()
    }

    pub fn resident_pages(&self) -> impl Iterator<Item = usize> + '_ {
        self.resident.iter()
    }

    pub fn clock_hand(&self) -> usize {
        self.resident.hand()
    }

    /// Picks a resident page under the policy configured in `os`, puts
    /// `new_vpn` in its place and returns the evicted page number.
    ///
    /// The victim stays in the table, it only stops being resident. Its
    /// frame, valid and dirty bits are the caller's business.
    pub fn select_next_resident_and_replace<O: OperatingSystem + ?Sized>(
        &mut self,
        os: &O,
        new_vpn: usize,
    ) -> Result<usize> {
        let policy = os.replacement_policy();

        match self.entries.get(new_vpn) {
            None => return Err(PageTableError::UnknownPage(new_vpn)),
            Some(entry) if entry.resident => return Err(PageTableError::AlreadyResident(new_vpn)),
            Some(_) => {}
        }

        let position = self
            .resident
            .pick_replacement_page(policy, &mut self.entries, &mut self.rng)?;

        self.claim_residency(new_vpn)?;
        let victim = self.resident.replace(position, new_vpn)?;
        if let Some(entry) = self.entries.get_mut(victim) {
            entry.resident = false;
        }

        os.diagnostic(&format!(
            "Process {}: {} algorithm selected pte: {}",
            self.pid, policy, victim
        ));

        Ok(victim)
    }

    fn claim_residency(&mut self, vpn: usize) -> Result<()> {
        let entry = self
            .entries
            .get_mut(vpn)
            .ok_or(PageTableError::UnknownPage(vpn))?;

        if entry.resident {
            return Err(PageTableError::AlreadyResident(vpn));
        }
        entry.resident = true;

        Ok(())
    }
}
