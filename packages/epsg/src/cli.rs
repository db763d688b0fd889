//! Command-line interface for the registry.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use roxmltree::Document;

use crate::config::{validate_urn, ServiceConfig, Source, StoreConfig, DEFAULT_DATABASE_PATH};
use crate::error::{EpsgError, Result};
use crate::load::GraphLoader;
use crate::registry::Registry;
use crate::schema::EntityClass;

/// EPSG Registry - Local copy of the EPSG geodetic parameter registry.
#[derive(Parser)]
#[command(name = "epsg-registry")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// SQLite database holding the registry
    #[arg(long, global = true, default_value = DEFAULT_DATABASE_PATH)]
    pub database: PathBuf,

    /// Use a throw-away in-memory database instead of --database
    #[arg(long, global = true)]
    pub in_memory: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// (Re-)create the registry from a GML file or the online registry.
    Init {
        /// GML dictionary file (default: download from the online registry)
        #[arg(long)]
        gml: Option<PathBuf>,

        /// Registry query endpoint to download from
        #[arg(long, conflicts_with = "gml")]
        endpoint: Option<String>,
    },

    /// Print one entity as YAML.
    Get {
        /// Entity URN (e.g., urn:ogc:def:crs:EPSG::4326)
        urn: String,
    },

    /// List stored entities.
    List {
        /// Only entities of this class (e.g., GeodeticCRS, Datum)
        #[arg(short, long)]
        class: Option<String>,
    },

    /// Print the number of stored entities.
    Count,

    /// Remove one entity.
    Delete {
        /// Entity URN
        urn: String,
    },

    /// Change the name of one entity.
    Rename {
        /// Entity URN
        urn: String,

        /// New name
        name: String,
    },

    /// Load a GML file without a database and summarize its contents.
    Inspect {
        /// GML dictionary file
        file: PathBuf,
    },
}

impl Cli {
    fn store_config(&self) -> StoreConfig {
        if self.in_memory {
            StoreConfig::InMemory
        } else {
            StoreConfig::File(self.database.clone())
        }
    }
}

/// Run the CLI.
pub fn run() -> Result<()> {
    execute(Cli::parse())
}

/// Execute parsed command-line arguments.
pub fn execute(cli: Cli) -> Result<()> {
    let store = cli.store_config();

    match cli.command {
        Commands::Init { gml, endpoint } => {
            let source = match (gml, endpoint) {
                (Some(path), _) => Source::File(path),
                (None, Some(endpoint)) => Source::Remote(ServiceConfig::new(endpoint)),
                (None, None) => Source::remote(),
            };
            init_command(&store, &source)
        }
        Commands::Get { urn } => get_command(&store, &urn),
        Commands::List { class } => list_command(&store, class.as_deref()),
        Commands::Count => count_command(&store),
        Commands::Delete { urn } => delete_command(&store, &urn),
        Commands::Rename { urn, name } => rename_command(&store, &urn, &name),
        Commands::Inspect { file } => inspect_command(&file),
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn parse_class(name: &str) -> Result<EntityClass> {
    EntityClass::parse(name).ok_or_else(|| EpsgError::UnknownClass(name.to_string()))
}

fn init_command(store: &StoreConfig, source: &Source) -> Result<()> {
    println!(
        "{} registry from {}",
        style("Initialising").bold(),
        style(source.describe()).cyan()
    );

    let mut registry = Registry::open(store)?;
    let pb = spinner("Loading entities...");
    let loaded = registry.bulk_load(source);
    pb.finish_and_clear();

    println!(
        "{} {} entities",
        style("Stored").green().bold(),
        loaded?
    );
    Ok(())
}

fn get_command(store: &StoreConfig, urn: &str) -> Result<()> {
    validate_urn(urn)?;
    let registry = Registry::open(store)?;
    let entity = registry.get(urn)?;
    print!("{}", serde_yaml_ng::to_string(&entity)?);
    Ok(())
}

fn list_command(store: &StoreConfig, class: Option<&str>) -> Result<()> {
    let class = class.map(parse_class).transpose()?.unwrap_or(EntityClass::Any);
    let registry = Registry::open(store)?;

    for entity in registry.query(class)? {
        println!(
            "{}  {}  {}",
            style(entity.identifier()).cyan(),
            entity.kind(),
            entity.name().unwrap_or_default()
        );
    }
    Ok(())
}

fn count_command(store: &StoreConfig) -> Result<()> {
    let registry = Registry::open(store)?;
    println!("{}", registry.count()?);
    Ok(())
}

fn delete_command(store: &StoreConfig, urn: &str) -> Result<()> {
    validate_urn(urn)?;
    let mut registry = Registry::open(store)?;
    registry.delete(urn)?;
    println!("{} {}", style("Deleted").green().bold(), urn);
    Ok(())
}

fn rename_command(store: &StoreConfig, urn: &str, name: &str) -> Result<()> {
    validate_urn(urn)?;
    let mut registry = Registry::open(store)?;
    registry.rename(urn, name)?;
    println!(
        "{} {} to {}",
        style("Renamed").green().bold(),
        urn,
        style(name).green()
    );
    Ok(())
}

fn inspect_command(file: &Path) -> Result<()> {
    let gml = std::fs::read_to_string(file)?;
    let document = Document::parse(&gml)?;

    let pb = spinner("Loading entities...");
    let mut loader = GraphLoader::new(&document);
    let loaded = loader.load_all();
    pb.finish_and_clear();
    let loaded = loaded?;

    let index = loader.index();
    println!("  Identifiers: {}", index.count());
    if index.duplicates() > 0 {
        println!(
            "  Duplicates: {}",
            style(index.duplicates()).yellow().bold()
        );
    }
    println!("  Loaded: {}", style(loaded).green());

    let set = loader.into_entities();
    for (kind, count) in set.kind_counts() {
        println!("    {kind}: {count}");
    }
    Ok(())
}
