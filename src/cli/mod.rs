//! Command-line interface for `discovery`.
//!
//! This module provides the CLI parsing and command routing using clap.

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use discovery_lib::{Impact, SortColumn, SortMode, Status, Surface, ViewMode};
use tracing::debug;

use crate::config::{Config, Overrides};
use crate::logging;
use commands::Context;

/// `discovery` (disc) - RICE idea board.
#[derive(Parser, Debug)]
#[command(name = "disc")]
#[command(
    author,
    version,
    about = "RICE idea board: score ideas, rank them, move them across a kanban",
    long_about = None,
    after_help = "Data lives in .discovery/ unless --dir or DISCOVERY_DIR says otherwise."
)]
pub struct Cli {
    /// Output format: text (default) or json
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Data directory
    #[arg(long, global = true, env = "DISCOVERY_DIR")]
    pub dir: Option<PathBuf>,

    /// Backup server base URL (serves /api/backup)
    #[arg(long, global = true, env = "DISCOVERY_BACKUP_URL")]
    pub backup_url: Option<String>,

    /// Backup file path (ignored when a backup URL is set)
    #[arg(long, global = true)]
    pub backup_file: Option<PathBuf>,

    /// Also write JSON logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a data directory
    Init {
        /// Overwrite an existing config.yaml
        #[arg(long)]
        force: bool,
    },

    /// Manage projects
    Project(ProjectCommand),

    /// Manage ideas
    Idea(IdeaCommand),

    /// Show the table view of the active project
    Table(TableArgs),

    /// Show the kanban view of the active project (alias: kanban)
    #[command(alias = "kanban")]
    Board(BoardArgs),

    /// Set the preferred view
    View {
        /// table or kanban
        mode: ViewMode,
    },

    /// Set the sort mode
    Sort {
        /// auto (ranked by score/column) or manual (drag order)
        mode: SortMode,
    },

    /// Drag an idea over a card or column and drop it
    Drag(DragArgs),

    /// Push or inspect the backup
    Backup(BackupCommand),

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },

    /// Show version information
    Version,
}

#[derive(Args, Debug)]
pub struct ProjectCommand {
    /// Project subcommand
    #[command(subcommand)]
    pub command: ProjectSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ProjectSubcommand {
    /// Create a project
    Add {
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Make it the active project
        #[arg(long)]
        open: bool,
    },

    /// List projects with idea counts
    List,

    /// Rename or re-describe a project
    Edit {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a project and all of its ideas
    Delete { id: String },

    /// Select the active project
    Open { id: String },

    /// Clear the active project
    Close,
}

#[derive(Args, Debug)]
pub struct IdeaCommand {
    /// Idea subcommand
    #[command(subcommand)]
    pub command: IdeaSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum IdeaSubcommand {
    /// Add an idea
    Add(IdeaAddArgs),

    /// Edit an idea
    Edit(IdeaEditArgs),

    /// Delete an idea
    Delete { id: String },

    /// Move an idea to another status
    Status { id: String, status: Status },

    /// Show one idea
    Show { id: String },
}

#[derive(Args, Debug)]
pub struct IdeaAddArgs {
    pub title: String,

    #[arg(short, long)]
    pub description: Option<String>,

    /// 1-10 [default: 5]
    #[arg(long)]
    pub reach: Option<f64>,

    /// 0.25, 0.5, 1, 2, 3 or minimal..massive [default: 1]
    #[arg(long)]
    pub impact: Option<Impact>,

    /// 0-100 [default: 80]
    #[arg(long)]
    pub confidence: Option<f64>,

    /// Hours, > 0 [default: 4]
    #[arg(long)]
    pub effort: Option<f64>,

    #[arg(long)]
    pub status: Option<Status>,

    /// Project ID (defaults to the active project)
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(Args, Debug)]
pub struct IdeaEditArgs {
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    #[arg(long)]
    pub reach: Option<f64>,

    #[arg(long)]
    pub impact: Option<Impact>,

    #[arg(long)]
    pub confidence: Option<f64>,

    #[arg(long)]
    pub effort: Option<f64>,

    /// Move to another status, keeping the current order
    #[arg(long)]
    pub status: Option<Status>,
}

#[derive(Args, Debug)]
pub struct TableArgs {
    /// Sort column: title, reach, impact, confidence, effort, score, status.
    /// Repeating the current column flips the direction.
    #[arg(long)]
    pub sort: Option<SortColumn>,

    #[arg(long, conflicts_with = "asc")]
    pub desc: bool,

    #[arg(long)]
    pub asc: bool,

    /// Project ID (defaults to the active project)
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(Args, Debug)]
pub struct BoardArgs {
    /// Project ID (defaults to the active project)
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(Args, Debug)]
pub struct DragArgs {
    /// Idea to drag
    pub id: String,

    /// Card ID or `column:<status>` to hover over and drop on
    #[arg(long)]
    pub over: String,

    #[arg(long, default_value = "kanban")]
    pub surface: Surface,

    /// Stop after hovering
    #[arg(long)]
    pub no_drop: bool,
}

#[derive(Args, Debug)]
pub struct BackupCommand {
    /// Backup subcommand
    #[command(subcommand)]
    pub command: BackupSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum BackupSubcommand {
    /// Push the board to the backup now
    Push,

    /// Show whether a backup exists
    Pull,
}

/// Run the CLI.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    let Some(command) = cli.command else {
        println!("disc - RICE idea board. Use --help for usage.");
        return Ok(());
    };
    debug!(command = command.name(), "Running command");

    let overrides = Overrides {
        dir: cli.dir,
        backup_url: cli.backup_url,
        backup_file: cli.backup_file,
    };

    match command {
        Commands::Version => commands::version::execute(cli.json),
        Commands::Completions { shell } => {
            commands::completions::execute(shell);
            Ok(())
        }
        Commands::Init { force } => commands::init::execute(&overrides, force, cli.json),
        command => {
            let config = Config::load(&overrides)?;
            let ctx = Context::new(cli.json, config);
            let mut session = commands::open_session(&ctx.config);

            let result = match command {
                Commands::Project(project) => {
                    commands::project::execute(&project.command, &mut session, &ctx)
                }
                Commands::Idea(idea) => commands::idea::execute(&idea.command, &mut session, &ctx),
                Commands::Table(args) => commands::table::execute(&args, &mut session, &ctx),
                Commands::Board(args) => commands::board::execute(&args, &session, &ctx),
                Commands::View { mode } => commands::prefs::set_view(mode, &mut session, &ctx),
                Commands::Sort { mode } => commands::prefs::set_sort(mode, &mut session, &ctx),
                Commands::Drag(args) => commands::drag::execute(&args, &mut session, &ctx),
                Commands::Backup(backup) => {
                    commands::backup::execute(&backup.command, &mut session, &ctx)
                }
                Commands::Version | Commands::Completions { .. } | Commands::Init { .. } => {
                    Ok(())
                }
            };

            // Push any backup the command scheduled before exiting.
            session.flush();
            result
        }
    }
}

impl Commands {
    const fn name(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Project(project) => match project.command {
                ProjectSubcommand::Add { .. } => "project add",
                ProjectSubcommand::List => "project list",
                ProjectSubcommand::Edit { .. } => "project edit",
                ProjectSubcommand::Delete { .. } => "project delete",
                ProjectSubcommand::Open { .. } => "project open",
                ProjectSubcommand::Close => "project close",
            },
            Self::Idea(idea) => match idea.command {
                IdeaSubcommand::Add(_) => "idea add",
                IdeaSubcommand::Edit(_) => "idea edit",
                IdeaSubcommand::Delete { .. } => "idea delete",
                IdeaSubcommand::Status { .. } => "idea status",
                IdeaSubcommand::Show { .. } => "idea show",
            },
            Self::Table(_) => "table",
            Self::Board(_) => "board",
            Self::View { .. } => "view",
            Self::Sort { .. } => "sort",
            Self::Drag(_) => "drag",
            Self::Backup(backup) => match backup.command {
                BackupSubcommand::Push => "backup push",
                BackupSubcommand::Pull => "backup pull",
            },
            Self::Completions { .. } => "completions",
            Self::Version => "version",
        }
    }
}
