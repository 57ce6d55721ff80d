//! CLI for the semantic support cache
//!
//! Subcommands cover provisioning (index lifecycle, cache reset), a
//! health probe and a one-shot `query` runner that drives a request
//! through the full cache pipeline.

pub mod admin;
pub mod query;

use clap::{Parser, Subcommand};

/// Similarity-gated response cache for a support agent
#[derive(Parser)]
#[command(name = "semantic-support-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the vector index (no-op if it already exists)
    CreateIndex,

    /// Drop the vector index
    DropIndex(admin::DropIndexArgs),

    /// Delete all cached vector and response records
    ResetCache,

    /// Check backend connectivity and index status
    Health,

    /// Run one request through the cache
    Query(query::QueryArgs),
}
