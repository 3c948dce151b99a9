//! Punchdesk administrative CLI
//!
//! Thin glue over the core: resolves the database location, wires up
//! logging, and maps subcommands onto the registry, ledger, and aggregator.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use punchdesk_core::{format_duration, Aggregator, Database, Punch, TimeClock};

mod config;
mod seed;

/// Punchdesk time-clock kiosk
#[derive(Debug, Parser)]
#[command(name = "punchdesk", about = "Time-clock kiosk administration")]
struct Cli {
    /// Database file (overrides the configured location)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Toggle attendance for a user by their ID string
    Punch {
        /// The user's external ID string
        id_string: String,
    },

    /// List currently signed-in users
    Status,

    /// Show summed attendance per user, largest first
    Report {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Close every open session (end of day)
    CloseAll,

    /// Register a new user
    Register {
        /// Display name
        name: String,
        /// Unique external ID string
        id_string: String,
    },

    /// Delete malformed session rows
    Purge,

    /// Drop all data and reseed sample users (development only)
    Reset {
        /// Confirm that losing all data is intended
        #[arg(long)]
        yes: bool,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run() {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run() -> punchdesk_core::Result<()> {
    let cli = Cli::parse();

    let db_path = match cli.database {
        Some(path) => path,
        None => config::Config::load()?.database_path()?,
    };
    let db = Database::open(&db_path)?;

    match cli.command {
        Command::Punch { id_string } => {
            let clock = TimeClock::new(&db);
            match clock.punch(&id_string, None)? {
                Punch::In(session) => {
                    if let Some(start) = session.start_time {
                        println!("Clocked in at {}", start.format("%H:%M:%S"));
                    }
                }
                Punch::Out(session) => {
                    let worked = session
                        .total_time()
                        .map(format_duration)
                        .unwrap_or_default();
                    println!("Clocked out after {worked}");
                }
            }
        }

        Command::Status => {
            let active = db.sessions().list_active()?;
            if active.is_empty() {
                println!("Nobody is signed in.");
            }
            for session in active {
                let name = match session.user_id {
                    Some(user_id) => db
                        .users()
                        .find_by_id(user_id)?
                        .map(|u| u.name)
                        .unwrap_or_else(|| "(unknown user)".to_string()),
                    None => "(unknown user)".to_string(),
                };
                match session.start_time {
                    Some(start) => println!("{name}  since {}", start.format("%Y-%m-%d %H:%M")),
                    None => println!("{name}  (never started)"),
                }
            }
        }

        Command::Report { json } => {
            let totals = Aggregator::new(&db).totals_by_user()?;
            if json {
                let entries: Vec<_> = totals
                    .iter()
                    .map(|t| {
                        serde_json::json!({
                            "name": t.name,
                            "total_minutes": t.total.num_minutes(),
                            "total": format_duration(t.total),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for t in totals {
                    println!("{:<24} {:>8}", t.name, format_duration(t.total));
                }
            }
        }

        Command::CloseAll => {
            let closed = db.sessions().close_all(None)?;
            println!("Closed {closed} session(s).");
        }

        Command::Register { name, id_string } => {
            let user = db.users().create(&name, &id_string)?;
            println!("Registered {} with ID string {}.", user.name, user.id_string);
        }

        Command::Purge => {
            let purged = db.sessions().purge_invalid()?;
            println!("Purged {purged} malformed session(s).");
        }

        Command::Reset { yes } => {
            if !yes {
                eprintln!("This deletes ALL users and sessions. Re-run with --yes to confirm.");
                process::exit(2);
            }
            db.reset_all_dangerous()?;
            seed::seed_sample_data(&db)?;
            println!("Database reset and reseeded.");
        }
    }

    Ok(())
}
