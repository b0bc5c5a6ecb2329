use clap::{Parser, Subcommand};
use keeplist_core::TaskFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "keeplist")]
#[command(version, about = "Ordered notes and to-do lists backed by a local SQLite file")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Database file holding every collection
    #[arg(long, env = "KEEPLIST_DB", default_value = "keeplist.sqlite3")]
    pub db: PathBuf,

    /// Absolute directory for rolling log files (logging is off when unset)
    #[arg(long, env = "KEEPLIST_LOG_DIR")]
    pub log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "KEEPLIST_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the to-do list
    #[command(subcommand)]
    Tasks(TaskCommand),

    /// Manage the notebook
    #[command(subcommand)]
    Notes(NoteCommand),

    /// Print the core library version
    Version,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Append a task
    Add {
        /// Task text (words are joined with spaces)
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// List tasks in order
    List {
        /// all|active|completed
        #[arg(long, short = 'f', default_value = "all")]
        filter: TaskFilter,
    },

    /// Flip a task between active and completed
    Toggle { id: String },

    /// Replace a task's text; empty text deletes the task
    Edit {
        id: String,
        /// New text (words are joined with spaces)
        text: Vec<String>,
    },

    /// Delete a task
    Delete { id: String },

    /// Move a task so it sits directly before another
    Move {
        /// Task being moved
        id: String,
        /// Task it should land before
        before: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum NoteCommand {
    /// List notes, newest first
    List,

    /// Print one note (defaults to the newest)
    Show { id: Option<String> },

    /// Create a note, or update one when --id is given
    Save {
        #[arg(long)]
        id: Option<String>,

        #[arg(long, short = 't', default_value = "")]
        title: String,

        #[arg(long, short = 'c', default_value = "")]
        content: String,
    },

    /// Delete a note
    Delete { id: String },
}
