use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::task::TaskId;
use crate::ops::view::{FilterMode, SortMode};

#[derive(Parser)]
#[command(name = "taskterm", about = concat!("taskterm v", env!("CARGO_PKG_VERSION"), " - tasks in your terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different task file
    #[arg(long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tasks through the filter, sort and search settings
    List(ListArgs),
    /// Show task details
    Show(IdArg),
    /// Show task counts
    Stats,
    /// List distinct tags with the number of tasks carrying each
    TagList,
    /// Add a task
    Add(AddArgs),
    /// Toggle a task between done and not done
    Done(IdArg),
    /// Delete a task
    Rm(IdArg),
    /// Replace a task's description
    Edit(EditArgs),
    /// Cycle a task's priority (low, medium, high)
    Priority(IdArg),
    /// Set or clear a task's due date
    Due(DueArgs),
    /// Replace a task's tags
    Tags(TagsArgs),
    /// Move a corrupt task file aside and start empty
    Reset(ResetArgs),
    /// View or manage the recovery log
    Recovery(RecoveryCmd),
    /// Read or change settings in config.toml
    Config(ConfigCmd),
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Which tasks to show (default: from config)
    #[arg(long, value_enum)]
    pub filter: Option<FilterMode>,
    /// Sort order (default: from config)
    #[arg(long, value_enum)]
    pub sort: Option<SortMode>,
    /// Only tasks whose description contains TEXT (case-insensitive)
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct IdArg {
    /// Task ID
    pub id: TaskId,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task description
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID
    pub id: TaskId,
    /// New description
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

#[derive(Args)]
pub struct DueArgs {
    /// Task ID
    pub id: TaskId,
    /// Due date as YYYY-MM-DD (omit to clear)
    pub date: Option<String>,
}

#[derive(Args)]
pub struct TagsArgs {
    /// Task ID
    pub id: TaskId,
    /// Comma-separated tags (omit to clear)
    pub tags: Option<String>,
}

#[derive(Args)]
pub struct ResetArgs {
    /// Reset even if the task file is readable
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RecoveryCmd {
    #[command(subcommand)]
    pub action: Option<RecoveryAction>,
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum RecoveryAction {
    /// Remove entries older than 30 days
    Prune(RecoveryPruneArgs),
    /// Print the path to the recovery log
    Path,
}

#[derive(Args)]
pub struct RecoveryPruneArgs {
    /// Remove all entries
    #[arg(long)]
    pub all: bool,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the value of a setting
    Get {
        /// Setting name, e.g. view.sort
        key: String,
    },
    /// Change a setting
    Set {
        /// Setting name, e.g. view.sort
        key: String,
        value: String,
    },
    /// Print the path to config.toml
    Path,
}
