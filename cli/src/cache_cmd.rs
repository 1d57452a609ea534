use crate::config::DocshelfConfig;
use crate::context::open_store;
use anyhow::Result;
use clap::Subcommand;
use docshelf_content::ContentCache;

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Show cached documents, most recently used first
    Stats,

    /// Remove every cached document
    Clear,

    /// Trim the cache down to its configured capacity
    Evict,
}

impl CacheCommand {
    pub fn run(self, config: &DocshelfConfig) -> Result<()> {
        let cache = ContentCache::untrimmed(open_store(config, false), config.cache_config());
        match self {
            CacheCommand::Stats => {
                let entries = cache.entries();
                println!(
                    "{} of {} entries in {}",
                    entries.len(),
                    config.cache.capacity,
                    config.cache.dir.display()
                );
                for entry in entries {
                    let truncated = if entry.truncated { "\ttruncated" } else { "" };
                    println!(
                        "{}\t{} chars\t{}{truncated}",
                        entry.path, entry.chars, entry.last_access
                    );
                }
            }
            CacheCommand::Clear => {
                let removed = cache.clear();
                println!("Removed {removed} cached documents");
            }
            CacheCommand::Evict => {
                let removed = cache.evict_if_over_capacity();
                println!("Evicted {removed} cached documents");
            }
        }
        Ok(())
    }
}
