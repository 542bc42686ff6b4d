use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
};
use pathviz_core::{GeneratorKind, SolverKind, VizConfig, logger};
use std::path::PathBuf;

use crate::app::App;

pub mod app;
pub mod event;
pub mod ui;

/// Interactive pathfinding visualizer: paint walls on a grid, send it to a
/// solver service, watch the search replay.
#[derive(Parser)]
#[command(name = "pathviz")]
#[command(about = "Terminal front end for the grid pathfinding service")]
struct Args {
    /// Grid rows (odd values recommended with maze generators)
    #[arg(long)]
    rows: Option<usize>,

    /// Grid columns (odd values recommended with maze generators)
    #[arg(long)]
    columns: Option<usize>,

    /// Milliseconds between two animation steps
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Deadline for one solver request, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// host:port of the solver service
    #[arg(short, long)]
    server: Option<String>,

    /// Pathfinding algorithm: BFS, DFS or Astar
    #[arg(long)]
    solver: Option<SolverKind>,

    /// Maze generator: Backtracker or Division
    #[arg(long)]
    generator: Option<GeneratorKind>,

    /// Explicit config file (default: the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> color_eyre::Result<VizConfig> {
        let mut config = match &self.config {
            Some(path) => VizConfig::load_from(path)?,
            None => VizConfig::load_or_default()?,
        };
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(columns) = self.columns {
            config.columns = columns;
        }
        if let Some(interval) = self.interval_ms {
            config.step_interval_ms = interval;
        }
        if let Some(timeout) = self.timeout_ms {
            config.request_timeout_ms = timeout;
        }
        if let Some(server) = self.server {
            config.server_addr = server;
        }
        if let Some(solver) = self.solver {
            config.solver = solver;
        }
        if let Some(generator) = self.generator {
            config.generator = generator;
        }
        Ok(config)
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let config = Args::parse().into_config()?;

    let (log_tx, log_rx) = logger::create_log_channel();
    logger::init_embedded(log_tx);

    // The solver client lives on its own runtime; completions come back to
    // the UI thread over the event channel.
    let runtime = tokio::runtime::Runtime::new()?;
    let app = App::new(config, runtime.handle().clone(), log_rx)?;

    let terminal = ratatui::init();
    execute!(std::io::stdout(), EnableMouseCapture)?;
    let result = app.run(terminal);
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();
    result
}
