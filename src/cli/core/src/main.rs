/* src/cli/core/src/main.rs */

mod config;
mod inspect;
mod render;
mod ui;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::{VitrineConfig, find_vitrine_config, load_vitrine_config};

#[derive(Parser)]
#[command(name = "vitrine", about = "Vitrine dos Links CLI")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Validate vitrine.toml and summarize its route table
  Check {
    /// Path to vitrine.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
  /// Print the route tree and aliases
  Routes {
    /// Path to vitrine.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
  /// Navigate headlessly and print the hydrated view
  Render {
    /// Route path with optional query, e.g. /suplementos?sub=whey (default route if omitted)
    path: Option<String>,
    /// Path to vitrine.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Per-request timeout in milliseconds
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,
  },
}

/// Resolve config path (explicit or auto-detected) and parse it
fn resolve_config(explicit: Option<PathBuf>) -> Result<(PathBuf, VitrineConfig)> {
  let path = match explicit {
    Some(p) => p,
    None => {
      let cwd = std::env::current_dir().context("failed to get cwd")?;
      find_vitrine_config(&cwd)?
    }
  };
  let config = load_vitrine_config(&path)?;
  Ok((path, config))
}

fn init_tracing() {
  let filter = EnvFilter::try_from_env("VITRINE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
  tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

#[tokio::main]
async fn main() -> Result<()> {
  init_tracing();
  let cli = Cli::parse();

  match cli.command {
    Command::Check { config } => {
      ui::banner("check");
      let (path, config) = match resolve_config(config) {
        Ok(loaded) => loaded,
        Err(err) => {
          ui::fail(&format!("{err:#}"));
          return Err(err);
        }
      };
      ui::arrow(&format!("reading {}", path.display()));
      let table = config.route_table()?;
      for line in inspect::summary(&config, &table) {
        ui::detail(&line);
      }
      let category_sections = table
        .routes()
        .flat_map(|r| r.sections.iter())
        .any(|s| s.api.is_none() && s.main.is_some() && s.sub.is_some());
      if category_sections && config.app.products_api.is_none() {
        ui::warn("app.products_api is not set; main + sub sections will fail to resolve");
      }
      ui::blank();
      ui::ok("route table is valid");
    }
    Command::Routes { config } => {
      let (_, config) = resolve_config(config)?;
      for line in inspect::tree(&config.route_table()?) {
        ui::raw(&line);
      }
    }
    Command::Render { path, config, timeout_ms } => {
      let (_, config) = resolve_config(config)?;
      let rendered =
        render::render(&config, path.as_deref(), Duration::from_millis(timeout_ms)).await?;
      tracing::info!(path = %rendered.path, title = %rendered.title, "rendered");
      ui::raw(&rendered.html);
    }
  }

  Ok(())
}
