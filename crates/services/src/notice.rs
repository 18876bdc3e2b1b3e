use std::fmt;

use storage::repository::{EntryRepository, GoalRepository};
use tracing::warn;
use tracker_core::model::{Goal, WeeklyEntry};

/// Non-fatal message produced when a read degraded to a default.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Notice {
    GoalUnreadable { reason: String },
    EntriesUnreadable { reason: String },
    EntriesSkipped { count: usize },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::GoalUnreadable { reason } => {
                write!(f, "saved goal could not be read ({reason}); showing no goal")
            }
            Notice::EntriesUnreadable { reason } => {
                write!(f, "weekly log could not be read ({reason}); showing no entries")
            }
            Notice::EntriesSkipped { count: 1 } => {
                f.write_str("1 stored weekly entry is unreadable and was left out")
            }
            Notice::EntriesSkipped { count } => {
                write!(f, "{count} stored weekly entries are unreadable and were left out")
            }
        }
    }
}

/// A value read from storage together with what went wrong reading it.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub value: T,
    pub notices: Vec<Notice>,
}

impl<T> Loaded<T> {
    #[must_use]
    pub fn clean(value: T) -> Self {
        Self {
            value,
            notices: Vec::new(),
        }
    }

    #[must_use]
    pub fn has_notices(&self) -> bool {
        !self.notices.is_empty()
    }

    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Loaded<U> {
        Loaded {
            value: f(self.value),
            notices: self.notices,
        }
    }
}

/// Read the goal, turning a storage failure into "no goal" plus a notice.
pub(crate) async fn read_goal(
    repo: &dyn GoalRepository,
    notices: &mut Vec<Notice>,
) -> Option<Goal> {
    match repo.load_goal().await {
        Ok(goal) => goal,
        Err(err) => {
            warn!(error = %err, "goal unreadable; treating as absent");
            notices.push(Notice::GoalUnreadable {
                reason: err.to_string(),
            });
            None
        }
    }
}

/// Read the weekly log, turning a storage failure into an empty log plus a
/// notice, and reporting skipped elements.
pub(crate) async fn read_entries(
    repo: &dyn EntryRepository,
    notices: &mut Vec<Notice>,
) -> Vec<WeeklyEntry> {
    match repo.load_entries().await {
        Ok(loaded) => {
            if loaded.has_skipped() {
                notices.push(Notice::EntriesSkipped {
                    count: loaded.skipped.len(),
                });
            }
            loaded.entries
        }
        Err(err) => {
            warn!(error = %err, "weekly log unreadable; treating as empty");
            notices.push(Notice::EntriesUnreadable {
                reason: err.to_string(),
            });
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_read_naturally() {
        assert_eq!(
            Notice::EntriesSkipped { count: 1 }.to_string(),
            "1 stored weekly entry is unreadable and was left out"
        );
        assert_eq!(
            Notice::EntriesSkipped { count: 3 }.to_string(),
            "3 stored weekly entries are unreadable and were left out"
        );
    }

    #[test]
    fn map_keeps_notices() {
        let loaded = Loaded {
            value: 2,
            notices: vec![Notice::EntriesSkipped { count: 1 }],
        };
        let mapped = loaded.map(|v| v * 10);
        assert_eq!(mapped.value, 20);
        assert!(mapped.has_notices());
        assert!(!Loaded::clean(()).has_notices());
    }
}
