//! plotmap CLI
//!
//! ```bash
//! plotmap serve                         # viewer + relay on the configured address
//! plotmap serve --bind 0.0.0.0:8000     # custom address
//! plotmap annotate map.svg -o out.svg   # annotate a local or remote plot map
//! plotmap plots https://cdn/x/map.svg   # list the plot groups found
//! plotmap relay https://cdn/x/map.svg   # fetch through the relay client
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use plot_api::SvgRelay;
use plot_config::PlotConfig;
use plot_core::PlotKey;
use plot_web::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "plotmap")]
#[command(about = "Interactive plot maps for layout listings")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.config/plotmap/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web server
    Serve {
        /// Address to bind, overrides the config
        #[arg(short, long)]
        bind: Option<String>,

        /// Print the route table before starting
        #[arg(long)]
        routes: bool,
    },

    /// Annotate a plot-map SVG
    Annotate {
        /// SVG file path or http(s) URL
        source: String,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Plot label to mark as selected
        #[arg(short, long)]
        selected: Option<String>,
    },

    /// List the plot groups in an SVG as JSON
    Plots {
        /// SVG file path or http(s) URL
        source: String,
    },

    /// Fetch an SVG through the relay client
    Relay {
        url: String,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Used when `RUST_LOG` is unset; every crate of the workspace plus the HTTP trace layer
const DEFAULT_FILTER: &str =
    "plotmap=info,plot_web=info,plot_viewer=info,plot_api=info,plot_svg=info,tower_http=info";

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);
    // Logs never share stdout with command output
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json);

    let config = PlotConfig::load(cli.config.as_deref()).context("loading config")?;

    match cli.command {
        Commands::Serve { bind, routes } => cmd_serve(config, bind, routes).await,
        Commands::Annotate { source, output, selected } => {
            cmd_annotate(&config, &source, output, selected).await
        }
        Commands::Plots { source } => cmd_plots(&config, &source).await,
        Commands::Relay { url, output } => cmd_relay(&config, &url, output).await,
    }
}

async fn cmd_serve(mut config: PlotConfig, bind: Option<String>, routes: bool) -> Result<()> {
    if let Some(bind) = bind {
        config.bind = bind;
    }
    if routes {
        plot_web::routes::print_routes();
    }
    tracing::info!(api = %config.api_base_url, "starting plotmap");

    let addr = config.bind.clone();
    let state = AppState::new(config).context("building listing API client")?;
    plot_web::serve(Arc::new(state), &addr)
        .await
        .map_err(|e| anyhow::anyhow!("server error: {e}"))
}

/// SVG text from a local file or, for http(s) sources, through the relay client
async fn read_source(config: &PlotConfig, source: &str) -> Result<String> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let relay = SvgRelay::new(&config.user_agent);
        let svg = relay.fetch(Some(source)).await?;
        return Ok(svg.text());
    }
    std::fs::read_to_string(source).with_context(|| format!("reading {source}"))
}

fn write_output(output: Option<PathBuf>, content: &[u8]) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Wrote {} bytes to {}", content.len(), path.display());
        }
        None => {
            use std::io::Write;
            std::io::stdout().write_all(content)?;
        }
    }
    Ok(())
}

async fn cmd_annotate(
    config: &PlotConfig,
    source: &str,
    output: Option<PathBuf>,
    selected: Option<String>,
) -> Result<()> {
    let raw = read_source(config, source).await?;
    let annotated = plot_svg::annotate(&raw).context("plot map cannot be annotated")?;

    let key = selected.as_deref().map(PlotKey::new);
    if let Some(key) = &key {
        if !annotated.contains(key) {
            tracing::warn!(%key, "no plot group carries this label");
        }
    }
    eprintln!("Found {} plot groups", annotated.plots().len());
    write_output(output, annotated.render(key.as_ref()).as_bytes())
}

async fn cmd_plots(config: &PlotConfig, source: &str) -> Result<()> {
    let raw = read_source(config, source).await?;
    let plots = plot_svg::plot_groups(&raw).context("plot map cannot be annotated")?;
    println!("{}", serde_json::to_string_pretty(&plots)?);
    Ok(())
}

async fn cmd_relay(config: &PlotConfig, url: &str, output: Option<PathBuf>) -> Result<()> {
    let relay = SvgRelay::new(&config.user_agent);
    let svg = relay.fetch(Some(url)).await?;
    write_output(output, &svg.body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_every_crate() {
        tracing_subscriber::EnvFilter::try_new(DEFAULT_FILTER).unwrap();
        for target in ["plotmap", "plot_web", "plot_viewer", "plot_api", "plot_svg", "tower_http"] {
            assert!(
                DEFAULT_FILTER.split(',').any(|d| d == format!("{target}=info")),
                "{target} missing from default filter"
            );
        }
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::try_parse_from(["plotmap", "plots", "map.svg", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Plots { ref source } if source == "map.svg"));
    }
}
