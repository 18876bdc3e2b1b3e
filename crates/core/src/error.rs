use thiserror::Error;

use crate::model::{EntryError, GoalError};

/// Any validation failure raised by the domain types.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Goal(#[from] GoalError),
    #[error(transparent)]
    Entry(#[from] EntryError),
}
