pub mod asset;
pub mod book;
pub mod ids;
pub mod output;
pub mod spine;
pub mod toc;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "epublink",
    version,
    about = "Rename files and rewrite ids inside EPUB packages without breaking links"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Resource,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Archive options file (TOML)
    #[arg(long, global = true, env = "EPUBLINK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Drop manifest entries and navPoints whose file is missing instead of failing
    #[arg(long, global = true)]
    pub tolerate_missing: bool,
}

#[derive(Subcommand, Debug)]
pub enum Resource {
    /// Whole-book operations: info, validate, new
    Book {
        #[command(subcommand)]
        command: book::BookCommand,
    },
    /// Asset operations: list, rename, unify-names, add-extensions, add, remove
    Asset {
        #[command(subcommand)]
        command: asset::AssetCommand,
    },
    /// Element id operations: duplicates, unify
    Ids {
        #[command(subcommand)]
        command: ids::IdsCommand,
    },
    /// Table of contents: show
    Toc {
        #[command(subcommand)]
        command: toc::TocCommand,
    },
    /// Spine operations: list
    Spine {
        #[command(subcommand)]
        command: spine::SpineCommand,
    },
}
