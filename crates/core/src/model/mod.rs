mod assessment;
mod entry;
mod goal;
mod ids;
mod user;

pub use assessment::{AssessmentParseError, Level, SugarCraving};
pub use entry::{EntryError, EntryField, WeeklyEntry, WeeklyEntryDraft};
pub use goal::{Goal, GoalDraft, GoalError, GoalField};
pub use ids::{EntryId, ParseIdError};
pub use user::{PatientSummary, Role, UserIdentity};
