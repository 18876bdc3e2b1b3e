use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use tracker_core::model::{GoalDraft, WeeklyEntryDraft};
use tracker_core::progress::SortOrder;

pub const DEFAULT_DB_URL: &str = "sqlite://tracker.sqlite3";

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDbUrl { raw: String },
    InvalidNumber { flag: &'static str, raw: String },
    InvalidDate { flag: &'static str, raw: String },
    InvalidChoice { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDate { flag, raw } => {
                write!(f, "invalid {flag} value (expected YYYY-MM-DD): {raw}")
            }
            ArgsError::InvalidChoice { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    GoalsShow,
    GoalsSet(GoalDraft),
    Log(WeeklyEntryDraft),
    History(SortOrder),
    Dashboard,
    Progress,
    Login { email: String, password: String },
    SignUp { email: String, password: String },
    Logout,
    WhoAmI,
    Patients,
}

impl Command {
    /// Page the command stands in for, checked against the route guard.
    #[must_use]
    pub fn route_path(&self) -> Option<&'static str> {
        match self {
            Command::GoalsShow | Command::GoalsSet(_) => Some("/goals"),
            Command::Log(_) => Some("/log"),
            Command::History(_) | Command::Dashboard => Some("/dashboard"),
            Command::Progress => Some("/progress"),
            Command::Patients => Some("/admin/patients"),
            Command::Login { .. } | Command::SignUp { .. } => Some("/login"),
            Command::Help | Command::Logout | Command::WhoAmI => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub db_url: String,
    pub command: Command,
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_value<T: FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<T, ArgsError> {
    let raw = require_value(args, flag)?;
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn parse_date(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<NaiveDate, ArgsError> {
    let raw = require_value(args, flag)?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| ArgsError::InvalidDate { flag, raw })
}

fn parse_choice<T: FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<T, ArgsError> {
    let raw = require_value(args, flag)?;
    raw.parse().map_err(|_| ArgsError::InvalidChoice { flag, raw })
}

impl Args {
    /// Parse the command line. `env_db` is `TRACKER_DB_URL`; `today` fills in
    /// the date of a weekly entry when `--date` is absent.
    pub fn parse(
        argv: impl IntoIterator<Item = String>,
        env_db: Option<String>,
        today: NaiveDate,
    ) -> Result<Self, ArgsError> {
        let mut db_url = env_db.map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);

        // `--db` is accepted anywhere on the line.
        let mut rest = Vec::new();
        let mut argv = argv.into_iter();
        while let Some(arg) = argv.next() {
            if arg == "--db" {
                let value = require_value(&mut argv, "--db")?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidDbUrl { raw: value });
                }
                db_url = normalize_sqlite_url(value);
            } else {
                rest.push(arg);
            }
        }

        let mut args = rest.into_iter();
        let command = match args.next() {
            None => Command::Help,
            Some(word) => match word.as_str() {
                "help" | "--help" | "-h" => Command::Help,
                "goals" => parse_goals(&mut args)?,
                "log" => Command::Log(parse_log(&mut args, today)?),
                "history" => parse_history(&mut args)?,
                "dashboard" => no_more(&mut args, Command::Dashboard)?,
                "progress" => no_more(&mut args, Command::Progress)?,
                "login" => {
                    let (email, password) = parse_credentials(&mut args)?;
                    Command::Login { email, password }
                }
                "signup" => {
                    let (email, password) = parse_credentials(&mut args)?;
                    Command::SignUp { email, password }
                }
                "logout" => no_more(&mut args, Command::Logout)?,
                "whoami" => no_more(&mut args, Command::WhoAmI)?,
                "patients" => no_more(&mut args, Command::Patients)?,
                _ => return Err(ArgsError::UnknownCommand(word)),
            },
        };

        Ok(Self { db_url, command })
    }
}

fn no_more(args: &mut impl Iterator<Item = String>, command: Command) -> Result<Command, ArgsError> {
    match args.next() {
        None => Ok(command),
        Some(arg) if arg == "--help" || arg == "-h" => Ok(Command::Help),
        Some(arg) => Err(ArgsError::UnknownArg(arg)),
    }
}

fn parse_goals(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    match args.next().as_deref() {
        None | Some("show") => no_more(args, Command::GoalsShow),
        Some("set") => {
            let mut draft = GoalDraft::new();
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--start" => draft.start_date = Some(parse_date(args, "--start")?),
                    "--end" => draft.end_date = Some(parse_date(args, "--end")?),
                    "--initial-weight" => {
                        draft.initial_weight = Some(parse_value(args, "--initial-weight")?);
                    }
                    "--target-weight" => {
                        draft.target_weight = Some(parse_value(args, "--target-weight")?);
                    }
                    "--initial-waist" => {
                        draft.initial_waist = Some(parse_value(args, "--initial-waist")?);
                    }
                    "--target-waist" => {
                        draft.target_waist = Some(parse_value(args, "--target-waist")?);
                    }
                    "--height" => draft.height = Some(parse_value(args, "--height")?),
                    _ => return Err(ArgsError::UnknownArg(arg)),
                }
            }
            Ok(Command::GoalsSet(draft))
        }
        Some(other) => Err(ArgsError::UnknownCommand(format!("goals {other}"))),
    }
}

fn parse_log(
    args: &mut impl Iterator<Item = String>,
    today: NaiveDate,
) -> Result<WeeklyEntryDraft, ArgsError> {
    let mut draft = WeeklyEntryDraft::new(today);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--date" => draft.date = parse_date(args, "--date")?,
            "--weight" => draft.weight = Some(parse_value(args, "--weight")?),
            "--waist" => draft.waist = Some(parse_value(args, "--waist")?),
            "--errors" => draft.errors = parse_value(args, "--errors")?,
            "--sleep" => draft.sleep = parse_value(args, "--sleep")?,
            "--water" => draft.water = parse_value(args, "--water")?,
            "--activity" => draft.physical_activity = true,
            "--meditation" => draft.meditation = true,
            "--perception" => draft.body_weight_perception = parse_choice(args, "--perception")?,
            "--energy" => draft.energy = parse_choice(args, "--energy")?,
            "--sugar" => draft.sugar_craving = parse_choice(args, "--sugar")?,
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(draft)
}

fn parse_history(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let mut order = SortOrder::Descending;
    for arg in args.by_ref() {
        match arg.as_str() {
            "--asc" => order = SortOrder::Ascending,
            "--desc" => order = SortOrder::Descending,
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::History(order))
}

fn parse_credentials(
    args: &mut impl Iterator<Item = String>,
) -> Result<(String, String), ArgsError> {
    let mut email = std::env::var("TRACKER_EMAIL").ok();
    let mut password = std::env::var("TRACKER_PASSWORD").ok();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--email" => email = Some(require_value(args, "--email")?),
            "--password" => password = Some(require_value(args, "--password")?),
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok((
        email.ok_or(ArgsError::MissingFlag { flag: "--email" })?,
        password.ok_or(ArgsError::MissingFlag { flag: "--password" })?,
    ))
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--db <sqlite_url>] <command> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  goals [show]                      Show the saved goal");
    eprintln!("  goals set --start <date> --end <date> --initial-weight <kg> --target-weight <kg>");
    eprintln!("            --initial-waist <cm> --target-waist <cm> --height <cm>");
    eprintln!("  log --weight <kg> --waist <cm> [--date <date>] [--errors <n>] [--sleep <h>]");
    eprintln!("      [--water <l>] [--activity] [--meditation] [--perception high|medium|low]");
    eprintln!("      [--energy high|medium|low] [--sugar constant|frequent|little|none]");
    eprintln!("  history [--asc|--desc]            List weekly entries (newest first)");
    eprintln!("  dashboard                         Progress summary");
    eprintln!("  progress                          Chart series and habit scores");
    eprintln!("  login --email <e> --password <p>  Sign in");
    eprintln!("  signup --email <e> --password <p> Create an account");
    eprintln!("  logout | whoami | patients");
    eprintln!();
    eprintln!("Dates use YYYY-MM-DD. Defaults: --db {DEFAULT_DB_URL}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TRACKER_DB_URL, TRACKER_AUTH_URL, TRACKER_AUTH_KEY, TRACKER_EMAIL,");
    eprintln!("  TRACKER_PASSWORD, RUST_LOG");
}

pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the database file (and its directory) so `SQLite` can open it.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_core::model::{Level, SugarCraving};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn parse(line: &str) -> Result<Args, ArgsError> {
        Args::parse(
            line.split_whitespace().map(String::from),
            Some("sqlite::memory:".into()),
            today(),
        )
    }

    #[test]
    fn empty_line_shows_help() {
        assert_eq!(parse("").unwrap().command, Command::Help);
        assert_eq!(parse("dashboard --help").unwrap().command, Command::Help);
    }

    #[test]
    fn db_flag_is_global() {
        let args = parse("history --db sqlite://other.db --asc").unwrap();
        assert_eq!(args.db_url, "sqlite://other.db");
        assert_eq!(args.command, Command::History(SortOrder::Ascending));
        assert!(matches!(
            parse("dashboard --db"),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
    }

    #[test]
    fn relative_db_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/tracker.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/tracker.sqlite3"));
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
    }

    #[test]
    fn goals_set_collects_fields() {
        let args = parse(
            "goals set --start 2024-01-01 --end 2024-06-01 --initial-weight 80 \
             --target-weight 72.5 --initial-waist 98 --target-waist 90 --height 170",
        )
        .unwrap();
        let Command::GoalsSet(draft) = args.command else {
            panic!("expected goals set");
        };
        assert_eq!(draft.target_weight, Some(72.5));
        assert_eq!(draft.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn goals_set_leaves_missing_fields_to_validation() {
        let Command::GoalsSet(draft) = parse("goals set --height 170").unwrap().command else {
            panic!("expected goals set");
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn log_defaults_to_today() {
        let Command::Log(draft) = parse("log --weight 79.4 --waist 96 --activity --energy alta --sugar none")
            .unwrap()
            .command
        else {
            panic!("expected log");
        };
        assert_eq!(draft.date, today());
        assert_eq!(draft.weight, Some(79.4));
        assert!(draft.physical_activity);
        assert!(!draft.meditation);
        assert_eq!(draft.energy, Level::High);
        assert_eq!(draft.sugar_craving, SugarCraving::None);
        assert_eq!(draft.body_weight_perception, Level::Medium);
    }

    #[test]
    fn bad_values_are_reported() {
        assert!(matches!(
            parse("log --weight heavy"),
            Err(ArgsError::InvalidNumber { flag: "--weight", .. })
        ));
        assert!(matches!(
            parse("log --date 04/03/2024"),
            Err(ArgsError::InvalidDate { flag: "--date", .. })
        ));
        assert!(matches!(
            parse("log --energy extreme"),
            Err(ArgsError::InvalidChoice { flag: "--energy", .. })
        ));
        assert!(matches!(parse("fly"), Err(ArgsError::UnknownCommand(_))));
        assert!(matches!(parse("dashboard now"), Err(ArgsError::UnknownArg(_))));
    }

    #[test]
    fn login_takes_flags() {
        let args = parse("login --email a@example.com --password pw").unwrap();
        assert_eq!(
            args.command,
            Command::Login {
                email: "a@example.com".into(),
                password: "pw".into()
            }
        );
        assert_eq!(args.command.route_path(), Some("/login"));
    }

    #[test]
    fn commands_map_to_pages() {
        assert_eq!(parse("patients").unwrap().command.route_path(), Some("/admin/patients"));
        assert_eq!(parse("progress").unwrap().command.route_path(), Some("/progress"));
        assert_eq!(parse("whoami").unwrap().command.route_path(), None);
    }
}
