use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{PhaseCommands, PlanCommands, TaskCommands};

/// Main command-line interface for the cairn plan lifecycle engine
///
/// Cairn breaks a plan into ordered phases and tasks, moves tasks through a
/// submit/approve/reject workflow and tracks their execution. Every plan is
/// stored as JSON documents under the data directory.
#[derive(Parser)]
#[command(version, about, name = "cairn")]
pub struct Args {
    /// Storage root. Defaults to $XDG_DATA_HOME/cairn/projects/{project}
    #[arg(long, global = true, env = "CAIRN_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Project the plans belong to
    #[arg(long, global = true, env = "CAIRN_PROJECT")]
    pub project: Option<String>,

    /// Require tasks to be approved before they can start
    #[arg(long, global = true)]
    pub strict_approval: bool,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the cairn CLI
///
/// - `plan`: create, review, approve and advance plans
/// - `task`: manage tasks and their approval workflow
/// - `phase`: manage phases, their approval and ordering
#[derive(Subcommand)]
pub enum Commands {
    /// Manage plans
    #[command(alias = "p")]
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Manage tasks within plans
    #[command(alias = "t")]
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Manage phases within plans
    #[command(alias = "ph")]
    Phase {
        #[command(subcommand)]
        command: PhaseCommands,
    },
}
