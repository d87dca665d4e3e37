mod config;
mod edit_cmds;
mod query_cmds;
mod resolve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use config::PlandocConfig;
use resolve::TaskRef;

#[derive(Parser)]
#[command(name = "plandoc", about = "Query and edit markdown plan documents")]
struct Cli {
    /// Plan document (overrides PLANDOC_FILE and the config file)
    #[arg(long, short = 'f', global = true)]
    file: Option<PathBuf>,

    /// Print query results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a plandoc config file
    InitConfig {
        /// Default plan document path to record
        #[arg(long)]
        document: Option<PathBuf>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Show the document title, summary fields and task counts
    Summary,
    /// List threads with task counts
    Threads,
    /// Show one thread with all of its tasks and steps
    Show {
        /// Thread number
        thread: u32,
    },
    /// Show the first incomplete task
    Next,
    /// Report numbering defects without changing the document
    CheckNumbering,
    /// Restore dense thread and task numbering (no audit entry)
    RepairNumbering,
    /// Task edits
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Step edits
    Step {
        #[command(subcommand)]
        command: StepCommands,
    },
    /// Thread edits
    Thread {
        #[command(subcommand)]
        command: ThreadCommands,
    },
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Mark a task and all of its steps complete
    Complete {
        /// Task reference, e.g. 2.1
        task: TaskRef,
        /// Reason recorded in the audit trail
        #[arg(long, short = 'm')]
        rationale: String,
    },
    /// Mark a task and all of its steps incomplete
    Reopen {
        /// Task reference, e.g. 2.1
        task: TaskRef,
        /// Reason recorded in the audit trail
        #[arg(long, short = 'm')]
        rationale: String,
    },
    /// Insert a task from a TOML or JSON spec file
    Insert {
        /// Thread to insert into
        #[arg(long)]
        thread: u32,
        /// Insert before this task number
        #[arg(long, conflicts_with = "after")]
        before: Option<u32>,
        /// Insert after this task number (default: end of thread)
        #[arg(long)]
        after: Option<u32>,
        /// Path to the task spec file
        #[arg(long)]
        spec: PathBuf,
        /// Reason recorded in the audit trail
        #[arg(long, short = 'm')]
        rationale: String,
    },
    /// Delete a task and its steps
    Delete {
        /// Task reference, e.g. 2.1
        task: TaskRef,
        /// Reason recorded in the audit trail
        #[arg(long, short = 'm')]
        rationale: String,
    },
    /// Replace a task's content, keeping its number
    Replace {
        /// Task reference, e.g. 2.1
        task: TaskRef,
        /// Path to the task spec file
        #[arg(long)]
        spec: PathBuf,
        /// Reason recorded in the audit trail
        #[arg(long, short = 'm')]
        rationale: String,
    },
    /// Reorder all tasks of a thread (e.g. `3,1,2`)
    Reorder {
        /// Thread number
        thread: u32,
        /// Current task numbers in their new order
        order: String,
        /// Reason recorded in the audit trail
        #[arg(long, short = 'm')]
        rationale: String,
    },
    /// Move a task before/after another task of the same thread
    Move {
        /// Task reference, e.g. 2.1
        task: TaskRef,
        /// Move before this task number
        #[arg(long, conflicts_with = "after")]
        before: Option<u32>,
        /// Move after this task number (default: end of thread)
        #[arg(long)]
        after: Option<u32>,
        /// Reason recorded in the audit trail
        #[arg(long, short = 'm')]
        rationale: String,
    },
}

#[derive(Subcommand)]
pub enum StepCommands {
    /// Mark one step complete
    Complete {
        /// Task reference, e.g. 2.1
        task: TaskRef,
        /// 1-based step position
        step: u32,
        /// Reason recorded in the audit trail
        #[arg(long, short = 'm')]
        rationale: String,
    },
    /// Mark one step incomplete
    Reopen {
        /// Task reference, e.g. 2.1
        task: TaskRef,
        /// 1-based step position
        step: u32,
        /// Reason recorded in the audit trail
        #[arg(long, short = 'm')]
        rationale: String,
    },
    /// Add a step to a task
    Add {
        /// Task reference, e.g. 2.1
        task: TaskRef,
        /// Step description
        description: String,
        /// Insert before this step position (default: append)
        #[arg(long)]
        before: Option<u32>,
        /// Add the step already completed
        #[arg(long)]
        done: bool,
        /// Reason recorded in the audit trail
        #[arg(long, short = 'm')]
        rationale: String,
    },
    /// Delete a step
    Delete {
        /// Task reference, e.g. 2.1
        task: TaskRef,
        /// 1-based step position
        step: u32,
        /// Reason recorded in the audit trail
        #[arg(long, short = 'm')]
        rationale: String,
    },
}

#[derive(Subcommand)]
pub enum ThreadCommands {
    /// Insert a thread from a TOML or JSON spec file
    Insert {
        /// Insert before this thread number
        #[arg(long, conflicts_with = "after")]
        before: Option<u32>,
        /// Insert after this thread number (default: end of document)
        #[arg(long)]
        after: Option<u32>,
        /// Path to the thread spec file
        #[arg(long)]
        spec: PathBuf,
        /// Reason recorded in the audit trail
        #[arg(long, short = 'm')]
        rationale: String,
    },
    /// Delete a thread with all of its tasks
    Delete {
        /// Thread number
        thread: u32,
        /// Reason recorded in the audit trail
        #[arg(long, short = 'm')]
        rationale: String,
    },
    /// Replace a thread's content, keeping its number
    Replace {
        /// Thread number
        thread: u32,
        /// Path to the thread spec file
        #[arg(long)]
        spec: PathBuf,
        /// Reason recorded in the audit trail
        #[arg(long, short = 'm')]
        rationale: String,
    },
    /// Reorder all threads (e.g. `2,1,3`)
    Reorder {
        /// Current thread numbers in their new order
        order: String,
        /// Reason recorded in the audit trail
        #[arg(long, short = 'm')]
        rationale: String,
    },
    /// Move a thread before/after another thread
    Move {
        /// Thread number
        thread: u32,
        /// Move before this thread number
        #[arg(long, conflicts_with = "after")]
        before: Option<u32>,
        /// Move after this thread number (default: end of document)
        #[arg(long)]
        after: Option<u32>,
        /// Reason recorded in the audit trail
        #[arg(long, short = 'm')]
        rationale: String,
    },
}

/// Execute the `plandoc init-config` command: write config file.
fn cmd_init_config(document: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        document: config::DocumentSection {
            path: document.clone(),
        },
    };
    let written = config::save_config(&cfg)?;

    println!("Config written to {}", written.display());
    match document {
        Some(doc) => println!("  document.path = {}", doc.display()),
        None => println!(
            "  document.path unset (defaults to {})",
            config::DEFAULT_DOCUMENT
        ),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let document = || PlandocConfig::resolve(cli.file.as_deref()).map(|c| c.document);

    match cli.command {
        Commands::InitConfig { document, force } => cmd_init_config(document, force)?,
        Commands::Summary => query_cmds::run_summary(&document()?, cli.json)?,
        Commands::Threads => query_cmds::run_threads(&document()?, cli.json)?,
        Commands::Show { thread } => query_cmds::run_show(&document()?, thread, cli.json)?,
        Commands::Next => query_cmds::run_next(&document()?, cli.json)?,
        Commands::CheckNumbering => query_cmds::run_check_numbering(&document()?, cli.json)?,
        Commands::RepairNumbering => edit_cmds::run_repair_numbering(&document()?)?,
        Commands::Task { command } => edit_cmds::run_task_command(command, &document()?)?,
        Commands::Step { command } => edit_cmds::run_step_command(command, &document()?)?,
        Commands::Thread { command } => edit_cmds::run_thread_command(command, &document()?)?,
    }

    Ok(())
}
