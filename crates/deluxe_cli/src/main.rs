use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use deluxe_cli::client::{CdnClient, EntrySource};
use deluxe_cli::preview::{PreviewOpts, run_preview};
use deluxe_cli::site::{BuildOpts, build_site};
use deluxe_core::assemble::{AssembleError, assemble_collection};
use deluxe_core::config::{ApiMode, DeliveryConfig, load_delivery_config};
use deluxe_core::delivery::{EntryCollection, PageQuery};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "deluxe", about = "Contentful page data loader and preview server")]
struct Cli {
    /// Optional YAML settings file; environment variables take precedence.
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Assemble a page from a saved delivery response and print it as JSON.")]
    Transform { input: PathBuf },
    #[command(about = "Fetch a page and print it as JSON.")]
    Fetch {
        #[arg(long, default_value = "home")]
        slug: String,
        #[arg(long)]
        preview: bool,
    },
    #[command(about = "Fetch a page and render it to HTML.")]
    Build {
        #[arg(long, value_name = "PATH", default_value = "_site")]
        out: PathBuf,
        #[arg(long, default_value = "home")]
        slug: String,
        #[arg(long, value_name = "PATH")]
        stylesheet: Option<PathBuf>,
        #[arg(long)]
        preview: bool,
    },
    #[command(about = "Serve the preview API.")]
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 3000)]
        port: u16,
        #[arg(long)]
        stylesheet_href: Option<String>,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Command::Transform { input } => run_transform(input),
        Command::Fetch { slug, preview } => run_fetch(&cli, slug, *preview),
        Command::Build {
            out,
            slug,
            stylesheet,
            preview,
        } => run_build(&cli, out, slug, stylesheet.as_ref(), *preview),
        Command::Serve {
            host,
            port,
            stylesheet_href,
        } => run_serve(&cli, host, *port, stylesheet_href.clone()),
    }
}

fn load_config(cli: &Cli) -> Result<DeliveryConfig> {
    load_delivery_config(cli.config.as_deref()).context("failed to load delivery settings")
}

fn api_mode(config: &DeliveryConfig, preview: bool) -> ApiMode {
    if preview {
        ApiMode::Preview
    } else {
        config.default_mode()
    }
}

fn print_page(collection: &EntryCollection, origin: &str) -> Result<()> {
    let page = match assemble_collection(collection) {
        Ok(page) => page,
        Err(AssembleError::NotFound) => bail!("no page record found in {origin}"),
    };
    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}

fn run_transform(input: &Path) -> Result<()> {
    let raw = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let collection = EntryCollection::from_json(&raw)
        .with_context(|| format!("failed to parse {}", input.display()))?;
    print_page(&collection, &input.display().to_string())
}

fn run_fetch(cli: &Cli, slug: &str, preview: bool) -> Result<()> {
    let config = load_config(cli)?;
    let mode = api_mode(&config, preview);
    let client = CdnClient::new(&config, mode)?;
    let collection = client.fetch_entries(&PageQuery::for_slug(Some(slug)))?;
    print_page(&collection, &format!("{mode:?} API for slug '{slug}'"))
}

fn run_build(
    cli: &Cli,
    out: &Path,
    slug: &str,
    stylesheet: Option<&PathBuf>,
    preview: bool,
) -> Result<()> {
    let config = load_config(cli)?;
    let client = CdnClient::new(&config, api_mode(&config, preview))?;
    let opts = BuildOpts {
        out_dir: out.to_path_buf(),
        slug: slug.to_string(),
        stylesheet: stylesheet.cloned(),
    };
    if let Err(err) = build_site(&client, &opts) {
        error!(error = %format!("{err:#}"), "build failed");
        std::process::exit(1);
    }
    Ok(())
}

fn run_serve(cli: &Cli, host: &str, port: u16, stylesheet_href: Option<String>) -> Result<()> {
    let config = load_config(cli)?;
    let client = CdnClient::new(&config, ApiMode::Preview)?;
    run_preview(
        PreviewOpts {
            host: host.to_string(),
            port,
            secret: config.preview_secret.clone(),
            stylesheet_href,
        },
        Arc::new(client),
    )
}
