//! CLI entry point for taskdeck.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use taskdeck_app::{ClientConfig, StoreError, TaskStore};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;

/// Personal task list backed by a remote endpoint.
#[derive(Parser, Debug)]
#[command(name = "taskdeck", version, about = "taskdeck: tasks and tags from a remote backend")]
struct Cli {
    /// Configuration file (defaults to $TASKDECK_CONFIG or the user config dir).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend endpoint, overriding the configuration file.
    #[arg(long)]
    endpoint: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List tasks, sorted by due date then priority.
    List {
        /// Named filter: all, pending, completed, high, or a tag name.
        #[arg(long, conflicts_with = "query")]
        filter: Option<String>,
        /// Search text, e.g. `priority:high tag:work report`.
        #[arg(long)]
        query: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Create a task.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        /// Due date as `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, or RFC 3339.
        #[arg(long)]
        due: Option<String>,
        #[arg(short = 't', long = "tag")]
        tags: Vec<String>,
    },

    /// Replace fields of an existing task.
    Edit {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        /// Remove the due date.
        #[arg(long)]
        clear_due: bool,
        /// Replace the tag list.
        #[arg(short = 't', long = "tag")]
        tags: Vec<String>,
    },

    /// Flip a task between pending and completed.
    Toggle {
        #[arg(long)]
        id: i64,
    },

    /// Delete a task.
    Rm {
        #[arg(long)]
        id: i64,
    },

    /// List tags.
    Tags {
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Create a tag.
    TagAdd {
        #[arg(long)]
        name: String,
        /// Color as `#RRGGBB`; defaults to the first palette entry.
        #[arg(long)]
        color: Option<String>,
    },

    /// Delete a tag. Tasks keep their reference to it.
    TagRm {
        #[arg(long)]
        name: String,
    },

    /// Show the configured tag palette.
    Palette,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    install_tracing();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", describe_failure(&err));
            ExitCode::FAILURE
        }
    }
}

fn run(Cli { config, endpoint, cmd }: Cli) -> Result<()> {
    let mut config = ClientConfig::load(config.as_deref())?;
    if let Some(endpoint) = endpoint {
        config = config.with_endpoint(endpoint);
    }
    let palette = config.palette();
    if matches!(cmd, Command::Palette) {
        print!("{}", commands::render_palette(&palette));
        return Ok(());
    }

    let store = TaskStore::new(config.build_backend()?);
    tokio::runtime::Runtime::new()?.block_on(async move {
        let output = commands::run(cmd, &store, &palette).await;
        store.dispose();
        print!("{}", output?);
        Ok(())
    })
}

/// Store failures become their notification text; anything else keeps its context chain.
fn describe_failure(err: &anyhow::Error) -> String {
    err.downcast_ref::<StoreError>()
        .map_or_else(|| format!("error: {err:#}"), StoreError::describe_user_facing)
}

fn install_tracing() {
    // RUST_LOG may be used to tune verbosity. Defaults to INFO.
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}
