//! Command-line surface of the `chorekeeper` binary.

use chorekeeper_core::{parse_target_date, PersonRole, RecurrenceKind, StrategyKind};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Top-level CLI parser for the `chorekeeper` binary.
#[derive(Debug, Parser)]
#[command(name = "chorekeeper", version, about = "Household chore tracking")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Extra TOML config file layered above the default locations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database path (overrides `database.path`)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Log level (overrides `logging.level`)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Mirror warnings and errors to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage household members
    Person {
        #[command(subcommand)]
        action: PersonCommand,
    },
    /// Manage chores and their recurrence
    Chore {
        #[command(subcommand)]
        action: ChoreCommand,
    },
    /// Assign a chore to a person for a day
    Assign(AssignArgs),
    /// Show the assignment board for a day
    Board(DayArgs),
    /// Replace a day's assignments with the previous day's
    CopyPrevious(DayArgs),
    /// Remove every assignment on a day
    Clear(DayArgs),
    /// Create assignments for due recurring chores
    Generate(GenerateArgs),
    /// Mark an assignment as done
    Complete(CompleteArgs),
    /// Approve or reject a completion
    Review(ReviewArgs),
    /// List completions awaiting review
    Queue(QueueArgs),
    /// Completion statistics
    Report {
        #[command(subcommand)]
        action: ReportCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum PersonCommand {
    Add {
        name: String,
        #[arg(long, value_enum, default_value = "child")]
        role: RoleArg,
    },
    List,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum RoleArg {
    Parent,
    Child,
}

impl From<RoleArg> for PersonRole {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Parent => PersonRole::Parent,
            RoleArg::Child => PersonRole::Child,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ChoreCommand {
    Add(ChoreAddArgs),
    List {
        /// Only recurring chores
        #[arg(long)]
        recurring: bool,
        /// Only recurring chores of this kind
        #[arg(long, value_parser = parse_kind_arg)]
        kind: Option<RecurrenceKind>,
    },
    /// Replace or clear a chore's recurrence rule
    Recurrence {
        chore_id: i64,
        /// daily, weekly, monthly, weekdays or specific_days
        #[arg(long, required_unless_present = "off")]
        kind: Option<String>,
        /// Weekday codes for specific_days, e.g. `M,W,F`
        #[arg(long)]
        days: Option<String>,
        /// Make the chore non-recurring
        #[arg(long, conflicts_with_all = ["kind", "days"])]
        off: bool,
    },
}

#[derive(Debug, Args)]
pub struct ChoreAddArgs {
    #[arg(long)]
    pub room: String,
    #[arg(long)]
    pub task: String,
    /// Free-text label such as Daily, Weekly or Annual
    #[arg(long, default_value = "Weekly")]
    pub frequency: String,
    /// Estimated minutes
    #[arg(long)]
    pub minutes: u32,
    /// Recurrence kind; omit for a one-off chore
    #[arg(long)]
    pub recurrence: Option<String>,
    /// Weekday codes for specific_days, e.g. `M,W,F`
    #[arg(long, requires = "recurrence")]
    pub days: Option<String>,
}

#[derive(Debug, Args)]
pub struct AssignArgs {
    pub chore_id: i64,
    pub person_id: i64,
    /// Assigned day (defaults to today)
    #[arg(long, value_parser = parse_date_arg)]
    pub date: Option<NaiveDate>,
    /// Due day (defaults to the assigned day)
    #[arg(long, value_parser = parse_date_arg)]
    pub due: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub struct DayArgs {
    /// Day to act on (defaults to today)
    #[arg(long, value_parser = parse_date_arg)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// First day to generate (defaults to today)
    #[arg(long, value_parser = parse_date_arg)]
    pub date: Option<NaiveDate>,
    /// Last day to generate, inclusive
    #[arg(long, value_parser = parse_date_arg)]
    pub through: Option<NaiveDate>,
    /// Assignee strategy (overrides `generation.strategy`)
    #[arg(long, value_parser = parse_strategy_arg)]
    pub strategy: Option<StrategyKind>,
    /// Seed for uniform_random (overrides `generation.seed`)
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Args)]
pub struct CompleteArgs {
    pub assignment_id: i64,
    /// Minutes actually spent
    #[arg(long)]
    pub minutes: u32,
    #[arg(long)]
    pub notes: Option<String>,
    /// File name of a photo taken as proof
    #[arg(long)]
    pub photo: Option<String>,
}

#[derive(Debug, Args)]
pub struct ReviewArgs {
    pub completion_id: i64,
    /// Person id of the reviewing parent
    #[arg(long)]
    pub reviewer: i64,
    #[arg(long, conflicts_with = "reject", required_unless_present = "reject")]
    pub approve: bool,
    #[arg(long)]
    pub reject: bool,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Debug, Args)]
pub struct QueueArgs {
    #[command(flatten)]
    pub range: RangeArgs,
    /// Include already reviewed completions
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct RangeArgs {
    /// First day (defaults to seven days before `--to`)
    #[arg(long, value_parser = parse_date_arg)]
    pub from: Option<NaiveDate>,
    /// Last day (defaults to today)
    #[arg(long, value_parser = parse_date_arg)]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// Household totals per day
    Family(RangeArgs),
    /// One person's totals per day
    Person {
        person_id: i64,
        #[command(flatten)]
        range: RangeArgs,
    },
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_target_date(value).map_err(|err| err.to_string())
}

fn parse_kind_arg(value: &str) -> Result<RecurrenceKind, String> {
    RecurrenceKind::parse(value).ok_or_else(|| {
        format!("unknown recurrence kind `{value}`; expected daily|weekly|monthly|weekdays|specific_days")
    })
}

fn parse_strategy_arg(value: &str) -> Result<StrategyKind, String> {
    StrategyKind::parse(value).ok_or_else(|| {
        format!("unknown strategy `{value}`; expected uniform_random|round_robin|least_recently_assigned")
    })
}
