//! CLI argument parsing for the serviceroute-worker binary.

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "serviceroute-worker", about = "Travel-aware appointment slot suggestions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the worker server (default if no subcommand given)
    Serve,
    /// Run database migrations and exit
    Migrate,
    /// Print the best slots for a job location and exit
    Suggest {
        /// Free-text job location, e.g. "Kazimierz, fix dishwasher"
        #[arg(long)]
        location: String,
        /// Calendar days to search, starting today
        #[arg(long)]
        days: Option<u32>,
    },
    /// Book an appointment after checking it does not collide
    Book {
        /// Free-text job location
        #[arg(long)]
        location: String,
        /// Local start time, e.g. 2026-03-02T08:00:00
        #[arg(long)]
        start: NaiveDateTime,
        /// Client name (defaults to the first word of the location text)
        #[arg(long)]
        client: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_migrate_command_parses() {
        let cli = Cli::parse_from(["serviceroute-worker", "migrate"]);
        assert!(matches!(cli.command, Some(Command::Migrate)));
    }

    #[test]
    fn test_cli_no_command_defaults_to_none() {
        let cli = Cli::parse_from(["serviceroute-worker"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_suggest_command_parses() {
        let cli = Cli::parse_from(["serviceroute-worker", "suggest", "--location", "Olsza", "--days", "3"]);
        match cli.command {
            Some(Command::Suggest { location, days }) => {
                assert_eq!(location, "Olsza");
                assert_eq!(days, Some(3));
            }
            _ => panic!("expected suggest"),
        }
    }

    #[test]
    fn test_cli_book_parses_start_time() {
        let cli = Cli::parse_from([
            "serviceroute-worker",
            "book",
            "--location",
            "Ruczaj",
            "--start",
            "2026-03-02T08:00:00",
        ]);
        match cli.command {
            Some(Command::Book { start, client, .. }) => {
                assert_eq!(start.to_string(), "2026-03-02 08:00:00");
                assert!(client.is_none());
            }
            _ => panic!("expected book"),
        }
    }

    #[test]
    fn test_cli_book_rejects_bad_start() {
        let result = Cli::try_parse_from([
            "serviceroute-worker",
            "book",
            "--location",
            "Ruczaj",
            "--start",
            "tomorrow",
        ]);
        assert!(result.is_err());
    }
}
