use std::fmt;

use chrono::{Duration, NaiveDate, Utc};
use storage::repository::Storage;
use tracker_core::model::{
    EntryId, Goal, GoalDraft, Level, SugarCraving, WeeklyEntry, WeeklyEntryDraft,
};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    weeks: u32,
    start: Option<NaiveDate>,
    replace_goal: bool,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidWeeks { raw: String },
    InvalidDbUrl { raw: String },
    InvalidStart { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidWeeks { raw } => write!(f, "invalid --weeks value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidStart { raw } => {
                write!(f, "invalid --start value (expected YYYY-MM-DD): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("TRACKER_DB_URL")
            .unwrap_or_else(|_| "sqlite:tracker.sqlite3?mode=rwc".into());
        let mut weeks = std::env::var("TRACKER_SEED_WEEKS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(6);
        let mut start = None;
        let mut replace_goal = false;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--weeks" => {
                    let value = require_value(&mut args, "--weeks")?;
                    weeks = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidWeeks { raw: value.clone() })?;
                }
                "--start" => {
                    let value = require_value(&mut args, "--start")?;
                    let parsed = NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                        .map_err(|_| ArgsError::InvalidStart { raw: value.clone() })?;
                    start = Some(parsed);
                }
                "--replace-goal" => replace_goal = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            weeks,
            start,
            replace_goal,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:tracker.sqlite3?mode=rwc)");
    eprintln!("  --weeks <n>               Number of weekly entries to append (default: 6)");
    eprintln!("  --start <YYYY-MM-DD>      Program start date (default: <weeks> weeks ago)");
    eprintln!("  --replace-goal            Overwrite an existing goal");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  TRACKER_DB_URL, TRACKER_SEED_WEEKS");
}

/// A 16-week goal and `weeks` entries trending steadily towards it.
fn demo_data(
    start: NaiveDate,
    weeks: u32,
    base_id: u64,
) -> Result<(Goal, Vec<WeeklyEntry>), tracker_core::Error> {
    let goal = GoalDraft {
        start_date: Some(start),
        end_date: Some(start + Duration::weeks(16)),
        initial_weight: Some(92.0),
        target_weight: Some(82.0),
        initial_waist: Some(104.0),
        target_waist: Some(94.0),
        height: Some(172.0),
    }
    .validate()?;

    let perceptions = [Level::Low, Level::Medium, Level::Medium, Level::High];
    let cravings = [
        SugarCraving::Constant,
        SugarCraving::Frequent,
        SugarCraving::Little,
        SugarCraving::None,
    ];
    let mut entries = Vec::new();
    for week in 0..weeks {
        let step = f64::from(week + 1);
        let idx = (week as usize) % perceptions.len();
        let mut draft = WeeklyEntryDraft::new(start + Duration::weeks(i64::from(week + 1)));
        draft.weight = Some(92.0 - step * 0.7);
        draft.waist = Some(104.0 - step * 0.6);
        draft.errors = 3_u32.saturating_sub(week);
        draft.physical_activity = week % 2 == 1;
        draft.sleep = 6.0 + step * 0.25;
        draft.meditation = week >= 2;
        draft.water = 1.5 + step * 0.2;
        draft.body_weight_perception = perceptions[idx];
        draft.energy = perceptions[idx];
        draft.sugar_craving = cravings[idx];
        entries.push(draft.validate(EntryId::new(base_id + u64::from(week)))?);
    }
    Ok((goal, entries))
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let start = args.start.unwrap_or_else(|| {
        Utc::now().date_naive() - Duration::weeks(i64::from(args.weeks))
    });

    let base_id = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    let (goal, entries) = demo_data(start, args.weeks, base_id)?;

    let existing = storage.goals.load_goal().await?;
    if existing.is_none() || args.replace_goal {
        storage.goals.save_goal(&goal).await?;
    }
    for entry in &entries {
        storage.entries.append_entry(entry).await?;
    }

    println!(
        "Seeded goal starting {start} and {} weekly entries into {}",
        args.weeks, args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
