use std::fmt;

/// The replacement algorithms a page table knows how to run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReplacementPolicy {
    Clock,
    Fifo,
    Random,
}

impl ReplacementPolicy {
    /// Resolves a configured algorithm name. Anything unrecognized runs as
    /// `Random`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "clock" | "second-chance" => ReplacementPolicy::Clock,
            "fifo" => ReplacementPolicy::Fifo,
            "random" => ReplacementPolicy::Random,
            other => {
                log::warn!("unknown replacement algorithm {:?}, falling back to random", other);
                ReplacementPolicy::Random
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ReplacementPolicy::Clock => "Clock",
            ReplacementPolicy::Fifo => "FIFO",
            ReplacementPolicy::Random => "Random",
        }
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a page table needs from the system that owns it.
pub trait OperatingSystem {
    /// Consulted once per eviction.
    fn replacement_policy(&self) -> ReplacementPolicy;

    /// Trace sink. Fire and forget.
    fn diagnostic(&self, message: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(ReplacementPolicy::from_name("clock"), ReplacementPolicy::Clock);
        assert_eq!(ReplacementPolicy::from_name("Second-Chance"), ReplacementPolicy::Clock);
        assert_eq!(ReplacementPolicy::from_name(" FIFO "), ReplacementPolicy::Fifo);
        assert_eq!(ReplacementPolicy::from_name("random"), ReplacementPolicy::Random);
    }

    #[test]
    fn test_unknown_name_falls_back_to_random() {
        assert_eq!(ReplacementPolicy::from_name("lru"), ReplacementPolicy::Random);
        assert_eq!(ReplacementPolicy::from_name(""), ReplacementPolicy::Random);
    }

    #[test]
    fn test_display() {
        assert_eq!(ReplacementPolicy::Fifo.to_string(), "FIFO");
        assert_eq!(ReplacementPolicy::Clock.to_string(), "Clock");
    }
}
