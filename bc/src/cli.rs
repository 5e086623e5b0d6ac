//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::ItemId;

/// bizc - one-person company business consultant
#[derive(Parser)]
#[command(
    name = "bizc",
    about = "Plan a one-person company with an AI business consultant and publish the plan as tasks",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute; starts a chat when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store a bearer token for the consultant services
    Login {
        /// Token issued by the identity service
        #[arg(long)]
        token: String,
    },

    /// Forget the stored token
    Logout,

    /// Show the signed-in identity
    Whoami,

    /// List your projects
    Projects,

    /// Select the project conversations and reports belong to
    Use {
        /// Project ID
        project_id: String,
    },

    /// Talk to the consultant
    Chat {
        /// Discard any unfinished conversation instead of asking
        #[arg(long)]
        new: bool,
    },

    /// List saved reports for the current project
    Reports,

    /// Work with a saved report
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
}

/// Report subcommands
#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// Show a report with its item ids and publish status
    Show {
        /// Report ID
        report_id: String,
    },

    /// Publish a workflow or role as a task (wf-N or role-N)
    Publish {
        /// Report ID
        report_id: String,

        /// Item ID (wf-N or role-N)
        item: ItemId,
    },

    /// Take a published item back to unpublished
    Cancel {
        /// Report ID
        report_id: String,

        /// Item ID (wf-N or role-N)
        item: ItemId,
    },

    /// Delete a report
    Delete {
        /// Report ID
        report_id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Export a report as a text file
    Export {
        /// Report ID
        report_id: String,

        /// Directory to write into (defaults to the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
