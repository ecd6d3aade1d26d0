use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum IdsCommand {
    /// List ids used by more than one section
    Duplicates {
        /// Path to the EPUB file
        file: PathBuf,
    },
    /// Rewrite duplicate ids so each occurs in one section, keeping links intact
    Unify {
        /// Path to the EPUB file
        file: PathBuf,
        /// Write the result here instead of in place
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
