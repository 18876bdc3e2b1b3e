use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Goal fields named in validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalField {
    StartDate,
    EndDate,
    InitialWeight,
    TargetWeight,
    InitialWaist,
    TargetWaist,
    Height,
}

impl fmt::Display for GoalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GoalField::StartDate => "start date",
            GoalField::EndDate => "end date",
            GoalField::InitialWeight => "initial weight",
            GoalField::TargetWeight => "target weight",
            GoalField::InitialWaist => "initial waist",
            GoalField::TargetWaist => "target waist",
            GoalField::Height => "height",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GoalError {
    #[error("{0} is required")]
    Missing(GoalField),

    #[error("{0} must be a positive number")]
    NotPositive(GoalField),

    #[error("end date must not be before the start date")]
    EndBeforeStart,

    #[error("target weight must be lower than the initial weight")]
    TargetWeightNotBelowInitial,

    #[error("target waist must be lower than the initial waist")]
    TargetWaistNotBelowInitial,
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated goal input, as collected from a form or a stored record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalDraft {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub initial_weight: Option<f64>,
    pub target_weight: Option<f64>,
    pub initial_waist: Option<f64>,
    pub target_waist: Option<f64>,
    pub height: Option<f64>,
}

impl GoalDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft for saving.
    ///
    /// Checks presence and positivity of every field, date ordering, and that
    /// both targets sit below their starting measurement.
    ///
    /// # Errors
    ///
    /// Returns the first `GoalError` found.
    pub fn validate(self) -> Result<Goal, GoalError> {
        let goal = self.into_goal()?;
        if goal.end_date < goal.start_date {
            return Err(GoalError::EndBeforeStart);
        }
        if goal.target_weight >= goal.initial_weight {
            return Err(GoalError::TargetWeightNotBelowInitial);
        }
        if goal.target_waist >= goal.initial_waist {
            return Err(GoalError::TargetWaistNotBelowInitial);
        }
        Ok(goal)
    }

    fn into_goal(self) -> Result<Goal, GoalError> {
        let start_date = self
            .start_date
            .ok_or(GoalError::Missing(GoalField::StartDate))?;
        let end_date = self.end_date.ok_or(GoalError::Missing(GoalField::EndDate))?;

        Ok(Goal {
            start_date,
            end_date,
            initial_weight: positive(self.initial_weight, GoalField::InitialWeight)?,
            target_weight: positive(self.target_weight, GoalField::TargetWeight)?,
            initial_waist: positive(self.initial_waist, GoalField::InitialWaist)?,
            target_waist: positive(self.target_waist, GoalField::TargetWaist)?,
            height: positive(self.height, GoalField::Height)?,
        })
    }
}

fn positive(value: Option<f64>, field: GoalField) -> Result<f64, GoalError> {
    let value = value.ok_or(GoalError::Missing(field))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(GoalError::NotPositive(field))
    }
}

//
// ─── GOAL ──────────────────────────────────────────────────────────────────────
//

/// The user's program: start/end dates and initial/target body measurements.
///
/// Weights are in kilograms, waist and height in centimeters.
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    start_date: NaiveDate,
    end_date: NaiveDate,
    initial_weight: f64,
    target_weight: f64,
    initial_waist: f64,
    target_waist: f64,
    height: f64,
}

impl Goal {
    /// Rebuild a goal that was already saved once.
    ///
    /// Only presence and positivity are enforced: a stored goal whose target
    /// equals its starting value still loads, and progress for that measure is
    /// reported as undefined.
    ///
    /// # Errors
    ///
    /// Returns `GoalError` if a field is missing or not positive.
    pub fn from_persisted(draft: GoalDraft) -> Result<Self, GoalError> {
        draft.into_goal()
    }

    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    #[must_use]
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    #[must_use]
    pub fn initial_weight(&self) -> f64 {
        self.initial_weight
    }

    #[must_use]
    pub fn target_weight(&self) -> f64 {
        self.target_weight
    }

    #[must_use]
    pub fn initial_waist(&self) -> f64 {
        self.initial_waist
    }

    #[must_use]
    pub fn target_waist(&self) -> f64 {
        self.target_waist
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Kilograms the program aims to lose.
    #[must_use]
    pub fn weight_to_lose(&self) -> f64 {
        self.initial_weight - self.target_weight
    }

    /// Centimeters of waist the program aims to lose.
    #[must_use]
    pub fn waist_to_lose(&self) -> f64 {
        self.initial_waist - self.target_waist
    }

    /// Back to an editable draft, e.g. to prefill a form.
    #[must_use]
    pub fn to_draft(&self) -> GoalDraft {
        GoalDraft {
            start_date: Some(self.start_date),
            end_date: Some(self.end_date),
            initial_weight: Some(self.initial_weight),
            target_weight: Some(self.target_weight),
            initial_waist: Some(self.initial_waist),
            target_waist: Some(self.target_waist),
            height: Some(self.height),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
