use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum BookCommand {
    /// Show information about an EPUB file
    Info {
        /// Path to the EPUB file
        file: PathBuf,
    },
    /// Check that every manifest href, navPoint src and inline link resolves
    Validate {
        /// Path to the EPUB file
        file: PathBuf,
    },
    /// Create an empty EPUB with container, package and NCX
    New {
        /// Output EPUB file path
        output: PathBuf,
        /// Book title
        #[arg(long)]
        title: String,
        /// Language code
        #[arg(long, default_value = "en")]
        language: String,
    },
}
