use thiserror::Error;

pub type Result<T> = std::result::Result<T, PageTableError>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTableError {
    /// Eviction was requested while no page of the process is in RAM.
    #[error("no resident page to evict")]
    EmptyResidentSet,

    #[error("page {0} is not in the page table")]
    UnknownPage(usize),

    #[error("page {0} is already resident")]
    AlreadyResident(usize),
}
