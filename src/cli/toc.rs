use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum TocCommand {
    /// Show the table of contents
    Show {
        /// Path to the EPUB file
        file: PathBuf,
        /// Maximum depth to display
        #[arg(long)]
        depth: Option<usize>,
    },
}
