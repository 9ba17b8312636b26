//! Command-line surface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "blackoutbox")]
#[command(about = "Blackoutbox watchdog: health-check triggers that escalate to printed documents", long_about = None)]
#[command(version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "BLACKOUTBOX_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scheduler until SIGINT/SIGTERM
    Run,

    /// Check every trigger once
    CheckTriggers,

    /// Refresh print jobs stuck in pending/printing
    CheckStuck {
        /// Staleness threshold (default: scheduler.stuck_job_threshold_secs)
        #[arg(long)]
        threshold_secs: Option<u64>,
    },

    /// Submit a file to the printer on behalf of a document
    Print {
        document_id: i64,
        file_path: String,
    },

    /// Poll the spooler for one print job
    JobStatus { job_id: i64 },

    /// List print jobs
    Jobs {
        /// Only jobs stuck for longer than this many seconds
        #[arg(long)]
        stuck_after_secs: Option<u64>,
    },

    /// Manage triggers
    #[command(subcommand)]
    Triggers(TriggerCommands),

    /// Manage documents
    #[command(subcommand)]
    Documents(DocumentCommands),

    /// Manage templates
    #[command(subcommand)]
    Templates(TemplateCommands),
}

#[derive(Subcommand, Debug)]
pub enum TriggerCommands {
    /// List all triggers
    List,

    /// Register a health-check URL for a system
    Add {
        #[arg(long)]
        system: String,

        #[arg(long)]
        url: String,

        /// Minimum failing time before escalation
        #[arg(long, default_value = "0")]
        buffer_secs: i64,
    },

    /// Clear failure state, re-arming a triggered trigger
    Reset { id: i64 },

    /// Mark a trigger as triggered without printing anything
    Mute { id: i64 },

    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum DocumentCommands {
    List {
        #[arg(long)]
        system: Option<String>,
    },

    Add {
        #[arg(long)]
        system: String,

        #[arg(long)]
        file_reference: String,

        #[arg(long)]
        path: String,

        /// Repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    Add {
        #[arg(long)]
        system: String,

        #[arg(long)]
        file_reference: String,

        #[arg(long)]
        path: String,

        #[arg(long, default_value = "")]
        description: String,
    },
}
