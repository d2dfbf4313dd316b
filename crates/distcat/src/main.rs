//! distcat - Statistical distribution catalog browser

mod cli;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use distcat_core::source::{DirectorySource, EmbeddedSource, GroupSource, HttpSource};
use distcat_core::{
    read_catalog, write_split, DistributionLoader, HttpSourceConfig, IndexTable, LoaderConfig,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "distcat",
    version,
    about = "Statistical distribution catalog browser",
    long_about = "Browse the distribution catalog through its lazy loader.\n\
                  \n\
                  The index is read eagerly; full records are fetched one group at a\n\
                  time from the bundled catalog, a data directory or an HTTP host.\n\
                  \n\
                  Examples:\n\
                    distcat index                          # List all distributions\n\
                    distcat show 3                         # Show one distribution\n\
                    distcat group 2 --json                 # Dump a group as JSON\n\
                    distcat --data-dir ./data stats        # Load everything, print cache stats\n\
                    distcat split catalog.json ./data      # Build index.json + group-N.json\n\
                  \n\
                  Environment Variables:\n\
                    DISTCAT_DATA_DIR                       # Directory with index.json and group files\n\
                    DISTCAT_BASE_URL                       # HTTP base URL for group files\n\
                    DISTCAT_CONFIG                         # Loader TOML config file\n\
                    DISTCAT_NO_COLOR                       # Disable ANSI colors\n\
                    RUST_LOG                               # Log filter (default: warn)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    source: SourceArgs,

    /// Disable ANSI colors
    #[arg(long, global = true, env = "DISTCAT_NO_COLOR")]
    no_color: bool,
}

/// Where the index and group payloads come from
#[derive(Args)]
struct SourceArgs {
    /// Directory containing index.json and group-<N>.json
    #[arg(long, global = true, env = "DISTCAT_DATA_DIR", conflicts_with = "base_url")]
    data_dir: Option<PathBuf>,

    /// Base URL serving group-<N>.json (index is read from --index or the bundle)
    #[arg(long, global = true, env = "DISTCAT_BASE_URL")]
    base_url: Option<String>,

    /// Index file to use with --base-url
    #[arg(long, global = true, requires = "base_url")]
    index: Option<PathBuf>,

    /// HTTP request timeout in seconds
    #[arg(long, global = true, default_value = "10")]
    timeout_secs: u64,

    /// Loader configuration file (TOML)
    #[arg(long, global = true, env = "DISTCAT_CONFIG")]
    config: Option<PathBuf>,

    /// Let concurrent loads of one group each fetch it
    #[arg(long, global = true)]
    no_single_flight: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List index entries
    Index {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one distribution by ID
    Show {
        id: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load every distribution of a group
    Group {
        group: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load all groups and print cache statistics as JSON
    Stats,
    /// Split a full catalog into index.json and group-<N>.json files
    Split {
        /// Catalog file (JSON array of distributions)
        catalog: PathBuf,
        /// Output directory
        out_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let no_color = cli.no_color;

    let command = match cli.command {
        Command::Split { catalog, out_dir } => return run_split(&catalog, &out_dir),
        command => command,
    };

    let loader = Arc::new(build_loader(&cli.source)?);

    match command {
        Command::Index { json } => run_index(&loader, json, no_color)?,
        Command::Show { id, json } => run_show(&loader, id, json).await?,
        Command::Group { group, json } => run_group(&loader, group, json, no_color).await?,
        Command::Stats => run_stats(&loader).await?,
        Command::Split { catalog, out_dir } => run_split(&catalog, &out_dir)?,
    }

    Ok(())
}

fn build_loader(args: &SourceArgs) -> Result<DistributionLoader> {
    let mut config = match &args.config {
        Some(path) => LoaderConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => LoaderConfig::default(),
    };
    if args.no_single_flight {
        config = config.with_single_flight(false);
    }

    let (index, source): (IndexTable, Arc<dyn GroupSource>) = if let Some(dir) = &args.data_dir {
        let index = IndexTable::load(&dir.join(distcat_core::split::INDEX_FILE_NAME))
            .with_context(|| format!("Failed to load index from {}", dir.display()))?;
        let source: Arc<dyn GroupSource> = Arc::new(DirectorySource::new(dir));
        (index, source)
    } else if let Some(base_url) = &args.base_url {
        let index = match &args.index {
            Some(path) => IndexTable::load(path)
                .with_context(|| format!("Failed to load index: {}", path.display()))?,
            None => IndexTable::bundled().context("Bundled index is invalid")?,
        };
        let http = HttpSource::new(
            HttpSourceConfig::new(base_url.clone())
                .with_timeout(Duration::from_secs(args.timeout_secs)),
        )
        .context("Failed to create HTTP source")?;
        let source: Arc<dyn GroupSource> = Arc::new(http);
        (index, source)
    } else {
        let index = IndexTable::bundled().context("Bundled index is invalid")?;
        let source: Arc<dyn GroupSource> = Arc::new(EmbeddedSource::new());
        (index, source)
    };

    Ok(DistributionLoader::new(index, source, config))
}

fn run_index(loader: &DistributionLoader, json: bool, no_color: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(loader.get_index())?);
    } else {
        println!("{}", cli::format_index_table(loader.get_index(), no_color));
    }
    Ok(())
}

async fn run_show(loader: &DistributionLoader, id: u32, json: bool) -> Result<()> {
    let distribution = match loader.load_distribution(id).await {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return Err(e).with_context(|| format!("Failed to load distribution {}", id));
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(distribution.as_ref())?);
    } else {
        print!("{}", cli::format_distribution(&distribution));
    }
    Ok(())
}

async fn run_group(
    loader: &DistributionLoader,
    group: u32,
    json: bool,
    no_color: bool,
) -> Result<()> {
    let records = loader
        .load_group(group)
        .await
        .with_context(|| format!("Failed to load group {}", group))?;

    if json {
        let plain: Vec<_> = records.iter().map(|d| d.as_ref()).collect();
        println!("{}", serde_json::to_string_pretty(&plain)?);
    } else {
        println!("{}", cli::format_group_table(group, &records, no_color));
    }
    Ok(())
}

async fn run_stats(loader: &Arc<DistributionLoader>) -> Result<()> {
    loader
        .load_all()
        .await
        .context("Failed to load distribution groups")?;

    let stats = loader.cache_stats();
    eprintln!("{}", cli::format_cache_stats(&stats));
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn run_split(catalog: &Path, out_dir: &Path) -> Result<()> {
    let records = read_catalog(catalog)
        .with_context(|| format!("Failed to read catalog: {}", catalog.display()))?;
    println!("Found {} distributions", records.len());

    let report = write_split(&records, out_dir)
        .with_context(|| format!("Failed to write split catalog to {}", out_dir.display()))?;
    println!("{}", cli::format_split_report(&report));
    Ok(())
}
