use std::fmt;
use std::str::FromStr;

/// Unique identifier for a weekly entry.
///
/// Assigned from a millisecond timestamp at creation; only uniqueness is
/// guaranteed, ordering is a convenience.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl EntryId {
    /// Creates a new `EntryId`
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying u64 value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The smallest id strictly greater than this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryId({})", self.0)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    raw: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse EntryId from {:?}", self.raw)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for EntryId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(EntryId::new)
            .map_err(|_| ParseIdError { raw: s.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_id_display() {
        let id = EntryId::new(1_700_000_000_000);
        assert_eq!(id.to_string(), "1700000000000");
    }

    #[test]
    fn entry_id_from_str() {
        let id: EntryId = " 123 ".parse().unwrap();
        assert_eq!(id, EntryId::new(123));
    }

    #[test]
    fn entry_id_from_str_invalid() {
        let err = "abc".parse::<EntryId>().unwrap_err();
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn next_is_strictly_greater() {
        assert_eq!(EntryId::new(41).next(), EntryId::new(42));
        assert_eq!(EntryId::new(u64::MAX).next(), EntryId::new(u64::MAX));
    }
}
