use anyhow::{Context, Result};
use clap::Parser;
use gridlife_app::{Frontend, terminal::TerminalFrontend};
use gridlife_core::{
    GridBounds, Session, SessionConfig, TemplateStore, Vec2, centering_offset, parse_template,
};
use gridlife_storage::TemplateLibrary;
use std::path::PathBuf;
use tracing::{info, warn};

/// Repository used for saves when none is given on the command line.
const DEFAULT_REPOSITORY: &str = "your_templates.json";

#[derive(Parser, Debug)]
#[command(
    name = "gridlife",
    version,
    about = "Conway's Game of Life with an interactive terminal session"
)]
struct Cli {
    /// Path to the JSON template repository.
    #[arg(env = "GRIDLIFE_REPOSITORY")]
    repository: Option<PathBuf>,

    /// Name of the pattern to seed the board with.
    pattern: Option<String>,

    /// Grid height in cells.
    #[arg(long, default_value_t = 40)]
    rows: u32,

    /// Grid width in cells.
    #[arg(long, default_value_t = 120)]
    columns: u32,

    /// Center the pattern within the grid instead of using its stored offsets.
    #[arg(long)]
    center: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let session = bootstrap_session(&cli)?;
    info!(grid = %session.board().bounds(), "Starting GridLife session");
    TerminalFrontend.run(session)
}

fn init_tracing() {
    // Stdout belongs to the TUI; logs go to stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn bootstrap_session(cli: &Cli) -> Result<Session> {
    let bounds = GridBounds::new(cli.rows, cli.columns)?;
    let config = SessionConfig {
        // One terminal cell per board cell; pointer mapping stays a floor
        // division like any pixel surface.
        block_size_pixels: 1,
        ..SessionConfig::default()
    };

    let library = match &cli.repository {
        Some(path) => TemplateLibrary::open(path),
        None => TemplateLibrary::open(DEFAULT_REPOSITORY),
    };
    let store: Box<dyn TemplateStore> = Box::new(library.clone());
    let mut session = Session::new(config, bounds, store)?;

    if let Some(name) = &cli.pattern {
        let record = library.load(name).with_context(|| {
            format!(
                "failed to load pattern '{name}' from {}",
                library.path().display()
            )
        })?;
        let offset = if cli.center {
            centering_offset(&record.template, bounds)
        } else {
            Vec2::new(record.col_offset, record.row_offset)
        };
        let cells = parse_template(&record.template, record.alive, offset);
        let total = cells.len();
        let dropped = session.seed(cells);
        if dropped > 0 {
            warn!(
                pattern = %name,
                dropped,
                "pattern does not fit the grid; clipped cells outside bounds"
            );
        }
        info!(pattern = %name, cells = total - dropped, "Seeded board from template");
    }

    Ok(session)
}
