use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

use crate::model::assessment::{Level, SugarCraving};
use crate::model::ids::EntryId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Numeric entry fields named in validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryField {
    Weight,
    Waist,
    Sleep,
    Water,
}

impl fmt::Display for EntryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryField::Weight => "weight",
            EntryField::Waist => "waist",
            EntryField::Sleep => "sleep hours",
            EntryField::Water => "water liters",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EntryError {
    #[error("{0} is required")]
    Missing(EntryField),

    #[error("{0} must be a positive number")]
    NotPositive(EntryField),

    #[error("{0} cannot be negative")]
    Negative(EntryField),
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Weekly log form input before an id is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyEntryDraft {
    pub date: NaiveDate,
    pub weight: Option<f64>,
    pub waist: Option<f64>,
    pub errors: u32,
    pub physical_activity: bool,
    pub sleep: f64,
    pub meditation: bool,
    pub water: f64,
    pub body_weight_perception: Level,
    pub energy: Level,
    pub sugar_craving: SugarCraving,
}

impl WeeklyEntryDraft {
    /// Blank form for the given date, with the same defaults the log page
    /// starts from.
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            weight: None,
            waist: None,
            errors: 0,
            physical_activity: false,
            sleep: 0.0,
            meditation: false,
            water: 0.0,
            body_weight_perception: Level::Medium,
            energy: Level::Medium,
            sugar_craving: SugarCraving::Little,
        }
    }

    /// Validate the draft and attach its id.
    ///
    /// # Errors
    ///
    /// Returns `EntryError` if weight or waist are missing or not positive,
    /// or if sleep/water are negative or not finite.
    pub fn validate(self, id: EntryId) -> Result<WeeklyEntry, EntryError> {
        let weight = measurement(self.weight, EntryField::Weight)?;
        let waist = measurement(self.waist, EntryField::Waist)?;
        let sleep = non_negative(self.sleep, EntryField::Sleep)?;
        let water = non_negative(self.water, EntryField::Water)?;

        Ok(WeeklyEntry {
            id,
            date: self.date,
            weight,
            waist,
            errors: self.errors,
            physical_activity: self.physical_activity,
            sleep,
            meditation: self.meditation,
            water,
            body_weight_perception: self.body_weight_perception,
            energy: self.energy,
            sugar_craving: self.sugar_craving,
        })
    }
}

fn measurement(value: Option<f64>, field: EntryField) -> Result<f64, EntryError> {
    let value = value.ok_or(EntryError::Missing(field))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(EntryError::NotPositive(field))
    }
}

fn non_negative(value: f64, field: EntryField) -> Result<f64, EntryError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(EntryError::Negative(field))
    }
}

//
// ─── ENTRY ─────────────────────────────────────────────────────────────────────
//

/// One week's measurements and self-reported habits.
///
/// Entries are immutable once created; the store only ever appends them.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyEntry {
    id: EntryId,
    date: NaiveDate,
    weight: f64,
    waist: f64,
    errors: u32,
    physical_activity: bool,
    sleep: f64,
    meditation: bool,
    water: f64,
    body_weight_perception: Level,
    energy: Level,
    sugar_craving: SugarCraving,
}

impl WeeklyEntry {
    #[must_use]
    pub fn id(&self) -> EntryId {
        self.id
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    #[must_use]
    pub fn waist(&self) -> f64 {
        self.waist
    }

    /// Diet deviations during the week.
    #[must_use]
    pub fn errors(&self) -> u32 {
        self.errors
    }

    #[must_use]
    pub fn physical_activity(&self) -> bool {
        self.physical_activity
    }

    /// Average nightly sleep in hours.
    #[must_use]
    pub fn sleep(&self) -> f64 {
        self.sleep
    }

    #[must_use]
    pub fn meditation(&self) -> bool {
        self.meditation
    }

    /// Daily water intake in liters.
    #[must_use]
    pub fn water(&self) -> f64 {
        self.water
    }

    #[must_use]
    pub fn body_weight_perception(&self) -> Level {
        self.body_weight_perception
    }

    #[must_use]
    pub fn energy(&self) -> Level {
        self.energy
    }

    #[must_use]
    pub fn sugar_craving(&self) -> SugarCraving {
        self.sugar_craving
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
