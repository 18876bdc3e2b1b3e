//! Derived statistics and chart series for the dashboard and progress pages.
//!
//! Everything here is a pure function of a [`Goal`] and a slice of
//! [`WeeklyEntry`] values. An empty slice yields `None` (or an empty
//! [`Series`]); a measure whose target equals its starting value has an
//! undefined percentage (`None`) instead of an infinite or NaN one.

use chrono::NaiveDate;

use crate::model::{Goal, Level, SugarCraving, WeeklyEntry};

/// Nightly sleep that scores 100.
pub const SLEEP_TARGET_HOURS: f64 = 8.0;
/// Daily water intake that scores 100.
pub const WATER_TARGET_LITERS: f64 = 2.5;
/// Points deducted from error control per diet deviation.
pub const ERROR_PENALTY: f64 = 20.0;

const FULL_SCORE: f64 = 100.0;

//
// ─── ORDERING ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first, as chart series are drawn.
    Ascending,
    /// Newest first, as history tables are listed.
    Descending,
}

/// Entries sorted by date.
///
/// Entries sharing a date keep insertion order when ascending and reverse
/// insertion order when descending, so the most recently logged entry for the
/// newest date is always the last ascending / first descending element.
#[must_use]
pub fn sorted_by_date(entries: &[WeeklyEntry], order: SortOrder) -> Vec<&WeeklyEntry> {
    let mut sorted: Vec<&WeeklyEntry> = entries.iter().collect();
    match order {
        SortOrder::Ascending => sorted.sort_by_key(|entry| entry.date()),
        SortOrder::Descending => {
            sorted.reverse();
            sorted.sort_by(|a, b| b.date().cmp(&a.date()));
        }
    }
    sorted
}

/// The entry with the greatest date; on ties, the one inserted last.
///
/// # Examples
///
/// ```
/// # use chrono::NaiveDate;
/// # use tracker_core::model::{EntryId, WeeklyEntryDraft};
/// # use tracker_core::progress::latest_entry;
/// let entry = |id, d| {
///     WeeklyEntryDraft {
///         weight: Some(80.0),
///         waist: Some(90.0),
///         ..WeeklyEntryDraft::new(NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
///     }
///     .validate(EntryId::new(id))
///     .unwrap()
/// };
/// let entries = vec![entry(1, 1), entry(2, 15), entry(3, 8)];
/// assert_eq!(latest_entry(&entries).unwrap().id(), EntryId::new(2));
/// ```
#[must_use]
pub fn latest_entry(entries: &[WeeklyEntry]) -> Option<&WeeklyEntry> {
    // `max_by_key` returns the last of several equal maxima.
    entries.iter().max_by_key(|entry| entry.date())
}

//
// ─── GOAL PROGRESS ─────────────────────────────────────────────────────────────
//

/// Share of the way from `initial` to `target` covered by `current`, in
/// percent and clamped to `[0, 100]`.
///
/// Returns `None` when `initial == target` or any input is not finite.
#[must_use]
pub fn measure_progress_percent(initial: f64, target: f64, current: f64) -> Option<f64> {
    let span = initial - target;
    if !span.is_finite() || span.abs() < f64::EPSILON || !current.is_finite() {
        return None;
    }
    let percent = (initial - current) / span * FULL_SCORE;
    percent
        .is_finite()
        .then(|| percent.clamp(0.0, FULL_SCORE))
}

/// Per-measure progress towards the goal for a single entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalProgress {
    pub weight: Option<f64>,
    pub waist: Option<f64>,
}

impl GoalProgress {
    #[must_use]
    pub fn for_entry(goal: &Goal, entry: &WeeklyEntry) -> Self {
        Self {
            weight: measure_progress_percent(
                goal.initial_weight(),
                goal.target_weight(),
                entry.weight(),
            ),
            waist: measure_progress_percent(
                goal.initial_waist(),
                goal.target_waist(),
                entry.waist(),
            ),
        }
    }

    /// Mean of the defined measures; a single defined measure stands alone.
    #[must_use]
    pub fn overall(&self) -> Option<f64> {
        match (self.weight, self.waist) {
            (Some(weight), Some(waist)) => Some((weight + waist) / 2.0),
            (Some(only), None) | (None, Some(only)) => Some(only),
            (None, None) => None,
        }
    }
}

/// Overall progress of the latest entry towards the goal, in `[0, 100]`.
#[must_use]
pub fn overall_progress_percent(goal: &Goal, latest: Option<&WeeklyEntry>) -> Option<f64> {
    latest.and_then(|entry| GoalProgress::for_entry(goal, entry).overall())
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

/// Dashboard figures derived from the latest entry and the entry count.
///
/// Weekly averages divide by the number of logged entries, not by elapsed
/// calendar weeks.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub current_weight: f64,
    pub current_waist: f64,
    pub weight_lost: f64,
    pub waist_lost: f64,
    pub weeks_logged: usize,
    pub avg_weight_loss_per_week: f64,
    pub avg_waist_loss_per_week: f64,
    pub weight_to_lose: f64,
    pub waist_to_lose: f64,
    /// Kilograms still above target, never negative.
    pub weight_remaining: f64,
    /// Centimeters still above target, never negative.
    pub waist_remaining: f64,
}

/// Summary figures, or `None` when nothing has been logged.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summary_stats(goal: &Goal, entries: &[WeeklyEntry]) -> Option<SummaryStats> {
    let latest = latest_entry(entries)?;
    let weeks_logged = entries.len();
    let weeks = weeks_logged as f64;

    let weight_lost = goal.initial_weight() - latest.weight();
    let waist_lost = goal.initial_waist() - latest.waist();

    Some(SummaryStats {
        current_weight: latest.weight(),
        current_waist: latest.waist(),
        weight_lost,
        waist_lost,
        weeks_logged,
        avg_weight_loss_per_week: weight_lost / weeks,
        avg_waist_loss_per_week: waist_lost / weeks,
        weight_to_lose: goal.weight_to_lose(),
        waist_to_lose: goal.waist_to_lose(),
        weight_remaining: (latest.weight() - goal.target_weight()).max(0.0),
        waist_remaining: (latest.waist() - goal.target_waist()).max(0.0),
    })
}

//
// ─── SERIES ────────────────────────────────────────────────────────────────────
//

/// Which body measurement a series plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Weight,
    Waist,
}

impl Measure {
    fn read(self, entry: &WeeklyEntry) -> f64 {
        match self {
            Measure::Weight => entry.weight(),
            Measure::Waist => entry.waist(),
        }
    }

    fn target(self, goal: &Goal) -> f64 {
        match self {
            Measure::Weight => goal.target_weight(),
            Measure::Waist => goal.target_waist(),
        }
    }
}

/// One point of a line chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    /// Short month and day, e.g. `"Jan 15"`.
    pub label: String,
    pub date: NaiveDate,
    pub measured: f64,
    pub target: f64,
}

/// A measurement series ordered by ascending date.
///
/// Points are produced on demand; [`Series::iter`] may be called any number
/// of times and always starts from the oldest entry.
#[derive(Debug, Clone)]
pub struct Series<'a> {
    measure: Measure,
    target: f64,
    entries: Vec<&'a WeeklyEntry>,
}

impl<'a> Series<'a> {
    #[must_use]
    pub fn new(measure: Measure, goal: &Goal, entries: &'a [WeeklyEntry]) -> Self {
        Self {
            measure,
            target: measure.target(goal),
            entries: sorted_by_date(entries, SortOrder::Ascending),
        }
    }

    #[must_use]
    pub fn measure(&self) -> Measure {
        self.measure
    }

    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn iter(&self) -> SeriesIter<'_, 'a> {
        SeriesIter {
            series: self,
            inner: self.entries.iter(),
        }
    }
}

impl<'s, 'a> IntoIterator for &'s Series<'a> {
    type Item = ChartPoint;
    type IntoIter = SeriesIter<'s, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the points of a [`Series`].
#[derive(Debug, Clone)]
pub struct SeriesIter<'s, 'a> {
    series: &'s Series<'a>,
    inner: std::slice::Iter<'s, &'a WeeklyEntry>,
}

impl Iterator for SeriesIter<'_, '_> {
    type Item = ChartPoint;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.inner.next()?;
        Some(ChartPoint {
            label: short_date_label(entry.date()),
            date: entry.date(),
            measured: self.series.measure.read(entry),
            target: self.series.target,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for SeriesIter<'_, '_> {}

#[must_use]
pub fn weight_series<'a>(goal: &Goal, entries: &'a [WeeklyEntry]) -> Series<'a> {
    Series::new(Measure::Weight, goal, entries)
}

#[must_use]
pub fn waist_series<'a>(goal: &Goal, entries: &'a [WeeklyEntry]) -> Series<'a> {
    Series::new(Measure::Waist, goal, entries)
}

/// Axis label for a chart point.
#[must_use]
pub fn short_date_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

//
// ─── HABITS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Habit {
    PhysicalActivity,
    Sleep,
    Meditation,
    Water,
    ErrorControl,
}

impl Habit {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Habit::PhysicalActivity => "Physical activity",
            Habit::Sleep => "Sleep",
            Habit::Meditation => "Meditation",
            Habit::Water => "Water",
            Habit::ErrorControl => "Error control",
        }
    }
}

/// Habit signals of one entry normalised to `[0, 100]` for a radar chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HabitScores {
    pub activity: f64,
    pub sleep: f64,
    pub meditation: f64,
    pub water: f64,
    pub error_control: f64,
}

impl HabitScores {
    #[must_use]
    pub fn from_entry(entry: &WeeklyEntry) -> Self {
        Self {
            activity: flag_score(entry.physical_activity()),
            sleep: ratio_score(entry.sleep(), SLEEP_TARGET_HOURS),
            meditation: flag_score(entry.meditation()),
            water: ratio_score(entry.water(), WATER_TARGET_LITERS),
            error_control: (FULL_SCORE - f64::from(entry.errors()) * ERROR_PENALTY).max(0.0),
        }
    }

    /// Radar axes in display order.
    #[must_use]
    pub fn axes(&self) -> [(Habit, f64); 5] {
        [
            (Habit::PhysicalActivity, self.activity),
            (Habit::Sleep, self.sleep),
            (Habit::Meditation, self.meditation),
            (Habit::Water, self.water),
            (Habit::ErrorControl, self.error_control),
        ]
    }
}

fn flag_score(flag: bool) -> f64 {
    if flag { FULL_SCORE } else { 0.0 }
}

fn ratio_score(value: f64, target: f64) -> f64 {
    (value / target * FULL_SCORE).clamp(0.0, FULL_SCORE)
}

/// Habit scores of the latest entry, or `None` when nothing has been logged.
#[must_use]
pub fn habit_scores(latest: Option<&WeeklyEntry>) -> Option<HabitScores> {
    latest.map(HabitScores::from_entry)
}

//
// ─── SELF ASSESSMENT ───────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aspect {
    BodyWeight,
    Energy,
    SugarControl,
}

impl Aspect {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Aspect::BodyWeight => "Body weight",
            Aspect::Energy => "Energy",
            Aspect::SugarControl => "Sugar control",
        }
    }
}

/// Self-reported perceptions of one entry on a `[0, 100]` scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelfAssessmentScores {
    pub body_weight_perception: f64,
    pub energy: f64,
    pub sugar_control: f64,
}

impl SelfAssessmentScores {
    #[must_use]
    pub fn from_entry(entry: &WeeklyEntry) -> Self {
        Self {
            body_weight_perception: level_score(entry.body_weight_perception()),
            energy: level_score(entry.energy()),
            sugar_control: craving_score(entry.sugar_craving()),
        }
    }

    #[must_use]
    pub fn axes(&self) -> [(Aspect, f64); 3] {
        [
            (Aspect::BodyWeight, self.body_weight_perception),
            (Aspect::Energy, self.energy),
            (Aspect::SugarControl, self.sugar_control),
        ]
    }
}

/// high → 100, medium → 50, low → 0.
#[must_use]
pub fn level_score(level: Level) -> f64 {
    match level {
        Level::High => 100.0,
        Level::Medium => 50.0,
        Level::Low => 0.0,
    }
}

/// Less craving scores higher: none → 100, little → 75, frequent → 25,
/// constant → 0.
#[must_use]
pub fn craving_score(craving: SugarCraving) -> f64 {
    match craving {
        SugarCraving::None => 100.0,
        SugarCraving::Little => 75.0,
        SugarCraving::Frequent => 25.0,
        SugarCraving::Constant => 0.0,
    }
}

#[must_use]
pub fn self_assessment_scores(latest: Option<&WeeklyEntry>) -> Option<SelfAssessmentScores> {
    latest.map(SelfAssessmentScores::from_entry)
}

//
// ─── TIMELINE ──────────────────────────────────────────────────────────────────
//

/// Where `today` falls within the goal's program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgramTimeline {
    pub total_days: i64,
    pub elapsed_days: i64,
    pub remaining_days: i64,
    /// `None` for a program that starts and ends on the same day.
    pub percent_elapsed: Option<f64>,
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn program_timeline(goal: &Goal, today: NaiveDate) -> ProgramTimeline {
    let total_days = (goal.end_date() - goal.start_date()).num_days().max(0);
    let elapsed_days = (today - goal.start_date())
        .num_days()
        .clamp(0, total_days);
    let percent_elapsed =
        (total_days > 0).then(|| elapsed_days as f64 / total_days as f64 * FULL_SCORE);

    ProgramTimeline {
        total_days,
        elapsed_days,
        remaining_days: total_days - elapsed_days,
        percent_elapsed,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
