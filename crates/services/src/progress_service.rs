use std::sync::Arc;

use storage::repository::{EntryRepository, GoalRepository};
use tracker_core::Clock;
use tracker_core::model::{Goal, WeeklyEntry};
use tracker_core::progress::{
    ChartPoint, GoalProgress, HabitScores, ProgramTimeline, SelfAssessmentScores, SortOrder,
    SummaryStats, habit_scores, latest_entry, overall_progress_percent, program_timeline,
    self_assessment_scores, sorted_by_date, summary_stats, waist_series, weight_series,
};

use crate::notice::{Loaded, Notice, read_entries, read_goal};

/// Everything the dashboard shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub goal: Goal,
    pub latest: Option<WeeklyEntry>,
    /// Weight and waist progress of the latest entry.
    pub progress: Option<GoalProgress>,
    pub overall_percent: Option<f64>,
    pub stats: Option<SummaryStats>,
    pub timeline: ProgramTimeline,
    /// Newest first.
    pub history: Vec<WeeklyEntry>,
}

/// Chart-ready data for the progress page.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressCharts {
    pub goal: Goal,
    pub weight: Vec<ChartPoint>,
    pub waist: Vec<ChartPoint>,
    pub habits: Option<HabitScores>,
    pub self_assessment: Option<SelfAssessmentScores>,
}

/// Combines the stored goal and weekly log through the progress calculator.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    goals: Arc<dyn GoalRepository>,
    entries: Arc<dyn EntryRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        clock: Clock,
        goals: Arc<dyn GoalRepository>,
        entries: Arc<dyn EntryRepository>,
    ) -> Self {
        Self {
            clock,
            goals,
            entries,
        }
    }

    /// Dashboard figures, or `None` when no goal has been saved.
    pub async fn dashboard(&self) -> Loaded<Option<Dashboard>> {
        let mut notices = Vec::new();
        let Some((goal, entries)) = self.read(&mut notices).await else {
            return Loaded {
                value: None,
                notices,
            };
        };

        let latest = latest_entry(&entries);
        let dashboard = Dashboard {
            progress: latest.map(|entry| GoalProgress::for_entry(&goal, entry)),
            overall_percent: overall_progress_percent(&goal, latest),
            stats: summary_stats(&goal, &entries),
            timeline: program_timeline(&goal, self.clock.today()),
            latest: latest.cloned(),
            history: sorted_by_date(&entries, SortOrder::Descending)
                .into_iter()
                .cloned()
                .collect(),
            goal,
        };
        Loaded {
            value: Some(dashboard),
            notices,
        }
    }

    /// Chart series and radar scores, or `None` when no goal has been saved.
    pub async fn charts(&self) -> Loaded<Option<ProgressCharts>> {
        let mut notices = Vec::new();
        let Some((goal, entries)) = self.read(&mut notices).await else {
            return Loaded {
                value: None,
                notices,
            };
        };

        let latest = latest_entry(&entries);
        let charts = ProgressCharts {
            weight: weight_series(&goal, &entries).iter().collect(),
            waist: waist_series(&goal, &entries).iter().collect(),
            habits: habit_scores(latest),
            self_assessment: self_assessment_scores(latest),
            goal,
        };
        Loaded {
            value: Some(charts),
            notices,
        }
    }

    async fn read(&self, notices: &mut Vec<Notice>) -> Option<(Goal, Vec<WeeklyEntry>)> {
        let goal = read_goal(self.goals.as_ref(), notices).await?;
        let entries = read_entries(self.entries.as_ref(), notices).await;
        Some((goal, entries))
    }
}
