//! Plain-text views of the service results.

use std::fmt::Write as _;

use services::{Dashboard, ProgressCharts};
use tracker_core::model::{Goal, PatientSummary, Role, UserIdentity, WeeklyEntry};
use tracker_core::progress::ChartPoint;

const BAR_WIDTH: usize = 20;

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.0}%"))
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn bar(score: f64) -> String {
    let filled = ((score / 100.0) * BAR_WIDTH as f64).round().clamp(0.0, BAR_WIDTH as f64) as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::Patient => "patient",
        Role::Admin => "admin",
    }
}

pub fn goal(goal: &Goal) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Program   {} to {}", goal.start_date(), goal.end_date());
    let _ = writeln!(
        out,
        "Weight    {:.1} kg -> {:.1} kg ({:.1} kg to lose)",
        goal.initial_weight(),
        goal.target_weight(),
        goal.weight_to_lose()
    );
    let _ = writeln!(
        out,
        "Waist     {:.1} cm -> {:.1} cm ({:.1} cm to lose)",
        goal.initial_waist(),
        goal.target_waist(),
        goal.waist_to_lose()
    );
    let _ = write!(out, "Height    {:.1} cm", goal.height());
    out
}

pub fn history(entries: &[WeeklyEntry]) -> String {
    if entries.is_empty() {
        return "No weekly entries yet.".to_string();
    }
    let mut out = String::from(
        "date        weight   waist  errors  activity  sleep  meditation  water  body    energy  sugar",
    );
    for entry in entries {
        let _ = write!(
            out,
            "\n{}  {:>6.1}  {:>6.1}  {:>6}  {:>8}  {:>5.1}  {:>10}  {:>5.1}  {:<6}  {:<6}  {}",
            entry.date(),
            entry.weight(),
            entry.waist(),
            entry.errors(),
            yes_no(entry.physical_activity()),
            entry.sleep(),
            yes_no(entry.meditation()),
            entry.water(),
            entry.body_weight_perception().as_str(),
            entry.energy().as_str(),
            entry.sugar_craving().as_str(),
        );
    }
    out
}

pub fn dashboard(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Overall progress  {}", percent(dashboard.overall_percent));
    if let Some(progress) = &dashboard.progress {
        let _ = writeln!(
            out,
            "  weight {}  waist {}",
            percent(progress.weight),
            percent(progress.waist)
        );
    }

    let timeline = &dashboard.timeline;
    let _ = writeln!(
        out,
        "Program           day {} of {} ({} left, {} elapsed)",
        timeline.elapsed_days,
        timeline.total_days,
        timeline.remaining_days,
        percent(timeline.percent_elapsed)
    );

    match &dashboard.stats {
        Some(stats) => {
            let _ = writeln!(
                out,
                "Current           {:.1} kg, {:.1} cm",
                stats.current_weight, stats.current_waist
            );
            let _ = writeln!(
                out,
                "Lost              {:.1} kg of {:.1}, {:.1} cm of {:.1}",
                stats.weight_lost, stats.weight_to_lose, stats.waist_lost, stats.waist_to_lose
            );
            let _ = writeln!(
                out,
                "Remaining         {:.1} kg, {:.1} cm",
                stats.weight_remaining, stats.waist_remaining
            );
            let _ = writeln!(
                out,
                "Per logged week   {:.2} kg, {:.2} cm over {} weeks",
                stats.avg_weight_loss_per_week,
                stats.avg_waist_loss_per_week,
                stats.weeks_logged
            );
        }
        None => {
            let _ = writeln!(out, "No weekly entries yet; log one with `log`.");
        }
    }

    let _ = writeln!(out);
    out.push_str(&history(&dashboard.history));
    out
}

fn series(title: &str, unit: &str, points: &[ChartPoint]) -> String {
    let mut out = title.to_string();
    if points.is_empty() {
        out.push_str("\n  no data");
        return out;
    }
    for point in points {
        let _ = write!(
            out,
            "\n  {:<7} {:>6.1} {unit}  (target {:.1})",
            point.label, point.measured, point.target
        );
    }
    out
}

pub fn charts(charts: &ProgressCharts) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", series("Weight", "kg", &charts.weight));
    let _ = writeln!(out, "{}", series("Waist", "cm", &charts.waist));

    let _ = writeln!(out, "Habits (latest week)");
    match &charts.habits {
        Some(habits) => {
            for (habit, score) in habits.axes() {
                let _ = writeln!(out, "  {:<18} {} {score:>3.0}", habit.label(), bar(score));
            }
        }
        None => {
            let _ = writeln!(out, "  no data");
        }
    }

    out.push_str("Self assessment (latest week)");
    match &charts.self_assessment {
        Some(scores) => {
            for (aspect, score) in scores.axes() {
                let _ = write!(out, "\n  {:<18} {} {score:>3.0}", aspect.label(), bar(score));
            }
        }
        None => out.push_str("\n  no data"),
    }
    out
}

pub fn user(user: &UserIdentity) -> String {
    format!("{} ({})", user.email, role_label(user.role))
}

pub fn patients(patients: &[PatientSummary]) -> String {
    if patients.is_empty() {
        return "No patients registered.".to_string();
    }
    patients
        .iter()
        .map(|p| {
            let joined = p
                .created_at
                .map_or_else(|| "-".to_string(), |at| at.date_naive().to_string());
            format!("{:<36}  {:<32}  {joined}", p.id, p.email)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
