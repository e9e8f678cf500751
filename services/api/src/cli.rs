use crate::inspect::{run_history, run_plan, HistoryArgs, PlanArgs};
use crate::seed::{run_seed, SeedArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use enrollment_core::config::AppConfig;
use enrollment_core::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Campus Enrollment",
    about = "Run the academic enrollment and evaluation services from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Load the demo catalog into an empty database
    Seed(SeedArgs),
    /// Show carry-overs and available courses for a student
    Plan(PlanArgs),
    /// Print a student's academic history grouped by cycle
    History(HistoryArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured SQLite database path
    #[arg(long)]
    pub(crate) database: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Seed(args) => run_seed(args).await,
        Command::Plan(args) => run_plan(args).await,
        Command::History(args) => run_history(args),
    }
}

/// Loads configuration, applying a `--database` override when given.
pub(crate) fn load_config(database: Option<String>) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(path) = database {
        config.database.path = path;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_line_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn subcommands_parse_their_flags() {
        let cli = Cli::try_parse_from(["campus", "history", "--student", "3", "--filter", "LAST_3"])
            .expect("history parses");
        match cli.command {
            Some(Command::History(args)) => {
                assert_eq!(args.student, 3);
                assert_eq!(args.filter, "LAST_3");
                assert!(!args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["campus", "serve", "--port", "8080", "--database", "x.db"])
            .expect("serve parses");
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(8080));
                assert_eq!(args.database.as_deref(), Some("x.db"));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        assert!(Cli::try_parse_from(["campus", "plan"]).is_err());
    }
}
