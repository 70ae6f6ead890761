//! `agenda` CLI: evaluate availability offline and work with the booking backend.
//!
//! ## Usage
//!
//! ```sh
//! # Free 30-minute slots for a day described in a local JSON document
//! agenda slots -i day.json --date 2026-03-16 --duration 30
//!
//! # Same, with working hours read in a zone and human-readable output
//! agenda --timezone America/Sao_Paulo slots -i day.json --date 2026-03-16 --duration 30 --format text
//!
//! # Blocked days of a month, and conflicts between appointments and blocks
//! agenda month -i day.json --year 2026 --month 3
//! agenda conflicts -i day.json
//!
//! # Backend
//! agenda login --email ana@example.com
//! agenda available --professional 4 --service 12 --date 2026-03-16
//! agenda book --professional 4 --service 12 --date 2026-03-16 --time 10:30
//! agenda blocks add --start-date 2026-03-20 --start-time 00:00 --end-time 23:59 --reason Holiday
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `agenda=info`).

mod local;
mod remote;

use std::io::{self, Read};
use std::path::PathBuf;

use agenda_client::ClientConfig;
use agenda_engine::DstPolicy;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "agenda", version, about = "Appointment availability and booking CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); defaults to <config dir>/agenda/config.toml when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// IANA timezone for working hours and calendar days (overrides configuration)
    #[arg(long, global = true)]
    timezone: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute bookable slots for a date from a local JSON document
    Slots {
        /// Input file with working_hours, appointments and blocks (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        #[arg(long)]
        date: NaiveDate,
        /// Service duration in minutes
        #[arg(long)]
        duration: i64,
        /// How to treat working-hour boundaries that fall in a DST gap
        #[arg(long, value_enum, default_value_t = Policy::Earliest)]
        dst_policy: Policy,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Check whether any block touches a day
    DayBlocked {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(long)]
        date: NaiveDate,
    },
    /// List partially and fully blocked days of a month
    Month {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
    },
    /// Report appointments that clash with blocks or with each other
    Conflicts {
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin if omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Search professionals
    Search {
        #[arg(long)]
        speciality: Option<String>,
    },
    /// Free slots of a professional's service on a date
    Available {
        #[arg(long)]
        professional: i64,
        #[arg(long)]
        service: i64,
        #[arg(long)]
        date: NaiveDate,
        /// Ask the backend instead of computing slots locally
        #[arg(long)]
        server: bool,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Manage availability blocks
    Blocks {
        #[command(subcommand)]
        action: BlockCommand,
    },
    /// Book a slot, as the signed-in client or as a guest
    Book {
        #[arg(long)]
        professional: i64,
        #[arg(long)]
        service: i64,
        #[arg(long)]
        date: NaiveDate,
        /// Local start time, HH:MM
        #[arg(long)]
        time: String,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long, requires_all = ["guest_email", "guest_phone"])]
        guest_name: Option<String>,
        #[arg(long)]
        guest_email: Option<String>,
        #[arg(long)]
        guest_phone: Option<String>,
    },
}

#[derive(Subcommand)]
enum BlockCommand {
    /// List blocks (defaults to the signed-in professional)
    List {
        #[arg(long)]
        professional: Option<i64>,
    },
    /// Create a block for the signed-in professional
    Add {
        #[arg(long)]
        start_date: String,
        #[arg(long)]
        start_time: String,
        /// Defaults to the start date
        #[arg(long)]
        end_date: Option<String>,
        #[arg(long)]
        end_time: String,
        #[arg(long, default_value = "")]
        reason: String,
    },
    /// Delete a block
    Rm { id: i64 },
}

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    Skip,
    ShiftForward,
    Earliest,
}

impl From<Policy> for DstPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Skip => DstPolicy::Skip,
            Policy::ShiftForward => DstPolicy::ShiftForward,
            Policy::Earliest => DstPolicy::Earliest,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    Json,
    Text,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("agenda=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = ClientConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(timezone) = cli.timezone {
        config.timezone = timezone;
    }
    let zone = config.zone().context("Invalid timezone")?;

    match cli.command {
        Commands::Slots {
            input,
            date,
            duration,
            dst_policy,
            format,
        } => {
            let doc = local::read_day(&read_input(input.as_deref())?)?;
            let out = local::slots(&doc, date, duration, zone, dst_policy.into(), format)?;
            write_output(&out);
        }
        Commands::DayBlocked { input, date } => {
            let doc = local::read_day(&read_input(input.as_deref())?)?;
            write_output(&local::day_blocked(&doc, date, zone)?);
        }
        Commands::Month { input, year, month } => {
            let doc = local::read_day(&read_input(input.as_deref())?)?;
            write_output(&local::month(&doc, year, month, zone)?);
        }
        Commands::Conflicts { input } => {
            let doc = local::read_day(&read_input(input.as_deref())?)?;
            write_output(&local::conflicts(&doc)?);
        }
        Commands::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => read_input(None)?.trim_end_matches(['\r', '\n']).to_string(),
            };
            let remote = remote::Remote::connect(&config, zone)?;
            let out = remote.login(email, password).await;
            remote.finish().await;
            write_output(&out?);
        }
        Commands::Logout => {
            let remote = remote::Remote::connect(&config, zone)?;
            write_output(&remote.logout());
        }
        Commands::Whoami => {
            let remote = remote::Remote::connect(&config, zone)?;
            write_output(&remote.whoami()?);
        }
        Commands::Search { speciality } => {
            let remote = remote::Remote::connect(&config, zone)?;
            let out = remote.search(speciality.as_deref()).await;
            remote.finish().await;
            write_output(&out?);
        }
        Commands::Available {
            professional,
            service,
            date,
            server,
            format,
        } => {
            let remote = remote::Remote::connect(&config, zone)?;
            let out = remote.available(professional, service, date, server, format).await;
            remote.finish().await;
            write_output(&out?);
        }
        Commands::Blocks { action } => {
            let remote = remote::Remote::connect(&config, zone)?;
            let out = match action {
                BlockCommand::List { professional } => remote.list_blocks(professional).await,
                BlockCommand::Add {
                    start_date,
                    start_time,
                    end_date,
                    end_time,
                    reason,
                } => {
                    let end_date = end_date.unwrap_or_else(|| start_date.clone());
                    let draft = agenda_engine::validation::BlockDraft {
                        start_date,
                        start_time,
                        end_date,
                        end_time,
                        reason,
                    };
                    remote.add_block(draft).await
                }
                BlockCommand::Rm { id } => remote.remove_block(id).await,
            };
            remote.finish().await;
            write_output(&out?);
        }
        Commands::Book {
            professional,
            service,
            date,
            time,
            notes,
            guest_name,
            guest_email,
            guest_phone,
        } => {
            let guest = guest_name.map(|name| agenda_engine::validation::GuestDraft {
                name,
                email: guest_email.unwrap_or_default(),
                phone: guest_phone.unwrap_or_default(),
            });
            let remote = remote::Remote::connect(&config, zone)?;
            let out = remote
                .book(remote::BookRequest {
                    professional,
                    service,
                    date,
                    time,
                    notes,
                    guest,
                })
                .await;
            remote.finish().await;
            write_output(&out?);
        }
    }

    Ok(())
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(content: &str) {
    if content.ends_with('\n') || content.is_empty() {
        print!("{}", content);
    } else {
        println!("{}", content);
    }
}
