use std::sync::Arc;

use services::{
    Access, AppServices, Clock, HttpIdentityProvider, IdentityProvider, Notice, SignUpOutcome,
    authorize,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod args;
mod render;

use args::{Args, Command, prepare_sqlite_file, print_usage};

const NO_GOAL: &str = "No goal saved yet. Set one with `goals set`.";

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn print_notices(notices: &[Notice]) {
    for notice in notices {
        eprintln!("note: {notice}");
    }
}

/// Resume the stored session and check the command against the route guard.
///
/// Without an identity service the tracker runs locally and nothing is
/// guarded.
async fn guard(services: &AppServices, command: &Command) -> Result<(), Box<dyn std::error::Error>> {
    let auth = services.auth();
    if !auth.is_configured() {
        debug!("identity service not configured; running without sign-in");
        return Ok(());
    }
    if let Err(err) = auth.restore_session().await {
        warn!(error = %err, "could not verify the stored session");
    }

    let Some(path) = command.route_path() else {
        return Ok(());
    };
    match authorize(path, auth.current_user().as_ref()) {
        Access::Allow(_) => Ok(()),
        Access::Redirect(route) => {
            Err(format!("{path} requires signing in first (see `login`, {route})").into())
        }
        Access::NotFound => Err(format!("{path}: not found").into()),
    }
}

async fn execute(services: &AppServices, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Help => print_usage(),
        Command::GoalsShow => {
            let loaded = services.goals().load().await;
            print_notices(&loaded.notices);
            match loaded.value {
                Some(goal) => println!("{}", render::goal(&goal)),
                None => println!("{NO_GOAL}"),
            }
        }
        Command::GoalsSet(draft) => {
            let goal = services.goals().save(draft).await?;
            println!("Goal saved.\n{}", render::goal(&goal));
        }
        Command::Log(draft) => {
            let entry = services.weekly_log().record(draft).await?;
            println!("Logged week of {} (id {}).", entry.date(), entry.id());
        }
        Command::History(order) => {
            let loaded = services.weekly_log().list(order).await;
            print_notices(&loaded.notices);
            println!("{}", render::history(&loaded.value));
        }
        Command::Dashboard => {
            let loaded = services.progress().dashboard().await;
            print_notices(&loaded.notices);
            match loaded.value {
                Some(dashboard) => println!("{}", render::dashboard(&dashboard)),
                None => println!("{NO_GOAL}"),
            }
        }
        Command::Progress => {
            let loaded = services.progress().charts().await;
            print_notices(&loaded.notices);
            match loaded.value {
                Some(charts) => println!("{}", render::charts(&charts)),
                None => println!("{NO_GOAL}"),
            }
        }
        Command::Login { email, password } => {
            let user = services.auth().sign_in(&email, &password).await?;
            println!("Signed in as {}.", render::user(&user));
        }
        Command::SignUp { email, password } => {
            match services.auth().sign_up(&email, &password).await? {
                SignUpOutcome::SignedIn(session) => {
                    println!("Account created; signed in as {}.", render::user(&session.user));
                }
                SignUpOutcome::ConfirmationRequired { email } => {
                    println!("Account created. Confirm the link sent to {email}, then `login`.");
                }
            }
        }
        Command::Logout => {
            services.auth().sign_out().await?;
            println!("Signed out.");
        }
        Command::WhoAmI => match services.auth().current_user() {
            Some(user) => println!("{}", render::user(&user)),
            None => println!("Not signed in."),
        },
        Command::Patients => {
            let patients = services.auth().list_patients().await?;
            println!("{}", render::patients(&patients));
        }
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let clock = Clock::default_clock();
    let args = Args::parse(
        std::env::args().skip(1),
        std::env::var("TRACKER_DB_URL").ok(),
        clock.today(),
    )
    .map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    if args.command == Command::Help {
        print_usage();
        return Ok(());
    }

    // Open + migrate SQLite here so the library crates never touch the filesystem layout.
    prepare_sqlite_file(&args.db_url)?;
    let identity = HttpIdentityProvider::from_env()
        .map(|provider| Arc::new(provider) as Arc<dyn IdentityProvider>);
    let services = AppServices::new_sqlite(&args.db_url, clock, identity).await?;

    guard(&services, &args.command).await?;
    execute(&services, args.command).await
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
