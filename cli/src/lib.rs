pub mod cache_cmd;
pub mod config;
pub mod context;
pub mod docs_cmd;

use anyhow::Result;
use cache_cmd::CacheCommand;
use clap::Parser;
use clap::Subcommand;
use config::DocshelfConfig;
use context::Docshelf;
use docs_cmd::ListArgs;
use docs_cmd::SearchArgs;
use docs_cmd::ShowArgs;
use docs_cmd::TocArgs;
use docshelf_catalog::CatalogError;
use std::path::PathBuf;

/// Exit status for a slug, role or document body that does not exist.
pub const EXIT_NOT_FOUND: u8 = 2;

/// Browse a role-based documentation set from the terminal
#[derive(Debug, Parser)]
#[command(name = "docshelf", version)]
pub struct Cli {
    /// Configuration file (defaults to ./docshelf.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Dataset to browse, overriding the configuration
    #[arg(long, global = true, value_name = "PATH")]
    pub dataset: Option<PathBuf>,

    /// Keep fetched documents in memory only
    #[arg(long, global = true)]
    pub no_cache: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List roles and how many documents each has
    Roles,

    /// List documents
    List(ListArgs),

    /// Search titles, descriptions and headings
    Search(SearchArgs),

    /// Print a document
    Show(ShowArgs),

    /// Print a document's table of contents
    Toc(TocArgs),

    /// Print every document route
    Routes,

    /// Inspect or maintain the document cache
    #[command(subcommand)]
    Cache(CacheCommand),
}

impl Cli {
    /// Resolve the effective configuration for this invocation.
    pub fn load_config(&self) -> Result<DocshelfConfig> {
        let mut config = DocshelfConfig::load(self.config.as_deref())?;
        if let Some(dataset) = &self.dataset {
            config.dataset.path = dataset.clone();
        }
        Ok(config)
    }

    pub async fn run(self, config: DocshelfConfig) -> Result<()> {
        let no_cache = self.no_cache;
        match self.command {
            Command::Cache(command) => command.run(&config),
            Command::Roles => docs_cmd::run_roles(&Docshelf::open(config, no_cache).await?),
            Command::List(args) => {
                docs_cmd::run_list(&Docshelf::open(config, no_cache).await?, args)
            }
            Command::Search(args) => {
                docs_cmd::run_search(&Docshelf::open(config, no_cache).await?, args).await
            }
            Command::Show(args) => {
                docs_cmd::run_show(&Docshelf::open(config, no_cache).await?, args).await
            }
            Command::Toc(args) => {
                docs_cmd::run_toc(&Docshelf::open(config, no_cache).await?, args).await
            }
            Command::Routes => docs_cmd::run_routes(&Docshelf::open(config, no_cache).await?),
        }
    }
}

/// Whether `err` is a routing miss rather than a failure.
pub fn is_not_found(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<CatalogError>())
        .any(CatalogError::is_not_found)
}
