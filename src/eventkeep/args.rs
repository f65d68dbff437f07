use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "eventkeep")]
#[command(about = "Keep calendar events safe on disk, shared with your widgets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Storage root (defaults to $EVENTKEEP_HOME, then the platform data dir)
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add an event
    #[command(alias = "n")]
    Add {
        /// Title of the event
        title: String,

        /// When it happens: "YYYY-MM-DD", "YYYY-MM-DD HH:MM" or "YYYY-MM-DDTHH:MM:SS"
        #[arg(short, long)]
        date: String,

        /// Free-form notes
        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// List all events in the order they were added
    #[command(alias = "ls")]
    List,

    /// Events on a given day ("today" or YYYY-MM-DD)
    On { day: String },

    /// Events coming up, earliest first
    Upcoming {
        /// How many days ahead to look (defaults to the configured window)
        #[arg(short, long)]
        days: Option<i64>,
    },

    /// Events in the current month, with a day overview
    Month,

    /// Change an event's title, date or notes
    #[command(alias = "e")]
    Edit {
        /// Position of the event in `list` (1-based)
        index: usize,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        date: Option<String>,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Mark an event done (or not done)
    #[command(alias = "t")]
    Toggle {
        /// Position of the event in `list` (1-based)
        index: usize,
    },

    /// Delete an event
    #[command(alias = "rm")]
    Delete {
        /// Position of the event in `list` (1-based)
        index: usize,
    },

    /// Show where events are stored and the backup state
    Status,
}
