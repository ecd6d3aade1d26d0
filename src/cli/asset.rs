use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum AssetCommand {
    /// List assets in an EPUB
    List {
        /// Path to the EPUB file
        file: PathBuf,
        /// Filter by asset type
        #[arg(long, value_parser = ["image", "css", "section", "other"])]
        r#type: Option<String>,
    },
    /// Rename an asset and update every reference to it
    Rename {
        /// Path to the EPUB file
        file: PathBuf,
        /// Asset path within the EPUB
        asset_path: String,
        /// New file name, or a full path when it contains '/'
        new_name: String,
        /// Write the result here instead of in place
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Rename images whose file names collide, ignoring case
    UnifyNames {
        /// Path to the EPUB file
        file: PathBuf,
        /// Write the result here instead of in place
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Give extension-less images the extension of their detected format
    AddExtensions {
        /// Path to the EPUB file
        file: PathBuf,
        /// Write the result here instead of in place
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Add an asset to an EPUB
    Add {
        /// Path to the EPUB file
        file: PathBuf,
        /// Path to the asset file to add
        asset: PathBuf,
        /// Media type override
        #[arg(long)]
        media_type: Option<String>,
        /// Write the result here instead of in place
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Remove an asset from an EPUB
    Remove {
        /// Path to the EPUB file
        file: PathBuf,
        /// Asset path within the EPUB, or its manifest id
        asset_path: String,
        /// Write the result here instead of in place
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
