//! Provisioning and health subcommands

use clap::Args;

use crate::config::AppConfig;
use crate::infrastructure::valkey::{connect, CacheAdmin};

#[derive(Args)]
pub struct DropIndexArgs {
    /// Also delete the indexed vector hashes (FT.DROPINDEX DD)
    #[arg(long)]
    pub delete_docs: bool,
}

async fn cache_admin(config: &AppConfig) -> anyhow::Result<CacheAdmin> {
    let connection = connect(&config.valkey).await?;
    Ok(CacheAdmin::new(connection, config.cache.clone()))
}

pub async fn create_index(config: &AppConfig) -> anyhow::Result<()> {
    let admin = cache_admin(config).await?;

    if admin.create_index().await? {
        println!("Created index '{}'", config.cache.index_name);
    } else {
        println!("Index '{}' already exists", config.cache.index_name);
    }

    Ok(())
}

pub async fn drop_index(config: &AppConfig, args: DropIndexArgs) -> anyhow::Result<()> {
    let admin = cache_admin(config).await?;

    if admin.drop_index(args.delete_docs).await? {
        println!("Dropped index '{}'", config.cache.index_name);
    } else {
        println!("Index '{}' does not exist", config.cache.index_name);
    }

    Ok(())
}

pub async fn reset_cache(config: &AppConfig) -> anyhow::Result<()> {
    let admin = cache_admin(config).await?;

    let deleted = admin.reset_cache().await?;
    println!("Deleted {} cached records", deleted);

    Ok(())
}

pub async fn health(config: &AppConfig) -> anyhow::Result<()> {
    let admin = cache_admin(config).await?;

    let report = admin.health().await?;
    println!("Backend reachable at {}", config.valkey.url);
    println!("Keys: {}", report.db_size);

    if report.indexes.is_empty() {
        println!("Indexes: none (run create-index)");
    } else {
        println!("Indexes: {}", report.indexes.join(", "));
    }

    Ok(())
}
