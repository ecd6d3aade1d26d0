mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::output::OutputConfig;
use cli::{Cli, Resource};
use epublink::epub::{self, Archive, navigation};
use epublink::manipulate;
use epublink::util::{asset_type, format_size};
use epublink::{ArchiveOptions, config};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = OutputConfig::from_global(cli.json, cli.verbose, cli.quiet, cli.no_color);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(output.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!output.no_color)
        .init();

    let mut options = match &cli.config {
        Some(path) => config::load_options(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ArchiveOptions::default(),
    };
    if cli.tolerate_missing {
        options.tolerate_missing_files = true;
    }

    match cli.command {
        Resource::Book { command } => handle_book(command, &options, &output)?,
        Resource::Asset { command } => handle_asset(command, &options, &output)?,
        Resource::Ids { command } => handle_ids(command, &options, &output)?,
        Resource::Toc { command } => handle_toc(command, &options, &output)?,
        Resource::Spine { command } => handle_spine(command, &options, &output)?,
    }

    Ok(())
}

fn open(file: &Path, options: &ArchiveOptions) -> Result<Archive> {
    epub::reader::read_epub(file, options.clone())
        .with_context(|| format!("failed to read {}", file.display()))
}

/// Read `file`, apply `modify`, and write the result to `out` or back in
/// place.
fn modify_archive<T>(
    file: &Path,
    out: Option<&PathBuf>,
    options: &ArchiveOptions,
    modify: impl FnOnce(&mut Archive) -> epublink::Result<T>,
) -> Result<T> {
    let mut archive = open(file, options)?;
    let result = modify(&mut archive)?;
    let target = out.map_or(file, PathBuf::as_path);
    epub::writer::write_epub(&archive, target)
        .with_context(|| format!("failed to write {}", target.display()))?;
    Ok(result)
}

fn handle_book(
    command: cli::book::BookCommand,
    options: &ArchiveOptions,
    output: &OutputConfig,
) -> Result<()> {
    use cli::book::BookCommand;

    match command {
        BookCommand::Info { file } => {
            let archive = open(&file, options)?;
            let package = archive.require_package()?;
            let meta = package.description();
            let spine_len = package.spine_items().len();
            let manifest_len = package.manifest_items().len();
            let image_count = archive.images().count();
            let total_size: usize = archive
                .store()
                .iter()
                .map(|(_, doc)| doc.to_bytes().len())
                .sum();

            if output.json {
                let mut info = serde_json::json!({
                    "title": meta.title.as_deref().unwrap_or("(untitled)"),
                    "authors": meta.authors,
                    "language": meta.language,
                    "epub_version": meta.version.to_string(),
                    "sections": spine_len,
                    "manifest_items": manifest_len,
                    "images": image_count,
                });
                if output.verbose {
                    info["package_path"] = serde_json::json!(package.path());
                    info["navigation_path"] = serde_json::json!(archive.navigation_path());
                    info["total_size_bytes"] = serde_json::json!(total_size);
                    info["metadata"] = serde_json::to_value(&meta)?;
                }
                output.print_json(&info)?;
            } else {
                println!("Title:    {}", meta.title.as_deref().unwrap_or("(untitled)"));
                if !meta.authors.is_empty() {
                    println!("Author:   {}", meta.authors.join(", "));
                }
                if let Some(language) = &meta.language {
                    println!("Language: {language}");
                }
                println!("Version:  EPUB {}", meta.version);
                println!("Sections: {spine_len}");
                println!("Manifest: {manifest_len}");
                println!("Images:   {image_count}");
                output.detail(&format!("Package:  {}", package.path()));
                output.detail(&format!("Size:     {}", format_size(total_size)));
                if !meta.identifiers.is_empty() {
                    output.detail(&format!("ID:       {}", meta.identifiers.join("; ")));
                }
                if let Some(cover) = &meta.cover_path {
                    output.detail(&format!("Cover:    {cover}"));
                }
                for series in &meta.series {
                    match &series.number {
                        Some(number) => output.detail(&format!("Series:   {} #{number}", series.name)),
                        None => output.detail(&format!("Series:   {}", series.name)),
                    }
                }
                if let Some(year) = meta.publish_year {
                    output.detail(&format!("Year:     {year}"));
                }
            }
        }
        BookCommand::Validate { file } => {
            let archive = open(&file, options)?;
            let package = archive.require_package()?;
            let meta = package.description();

            let mut issues: Vec<String> = Vec::new();
            if meta.title.is_none() {
                issues.push("missing dc:title".to_string());
            }
            if meta.language.is_none() {
                issues.push("missing dc:language".to_string());
            }
            if meta.identifiers.is_empty() {
                issues.push("missing dc:identifier".to_string());
            }
            for broken in manipulate::check_references(&archive) {
                if broken.target.is_empty() {
                    issues.push(format!(
                        "{}: spine references missing manifest item {}",
                        broken.from, broken.reference
                    ));
                } else {
                    issues.push(format!(
                        "{}: {} does not resolve ({})",
                        broken.from, broken.reference, broken.target
                    ));
                }
            }

            if output.json {
                let json = serde_json::json!({
                    "valid": issues.is_empty(),
                    "issues": issues,
                });
                output.print_json(&json)?;
            } else if issues.is_empty() {
                println!("{}: valid", file.display());
            } else {
                println!("{}: {} issue(s)", file.display(), issues.len());
                for issue in &issues {
                    output.problem(&format!("  - {issue}"));
                }
            }
            output.detail(&format!(
                "  Checked: metadata, {} documents",
                archive.store().len()
            ));
            if !issues.is_empty() {
                anyhow::bail!("{} failed validation", file.display());
            }
        }
        BookCommand::New {
            output: out_file,
            title,
            language,
        } => {
            let mut archive = Archive::with_skeleton(options.clone())?;
            let package = archive.require_package_mut()?;
            let identifier = format!("urn:uuid:{}", uuid::Uuid::new_v4());
            package.set_unique_identifier("BookId");
            package.append_dublin_core("title", &title, &[]);
            package.append_dublin_core("language", &language, &[]);
            package.append_dublin_core("identifier", &identifier, &[("id", "BookId")]);
            if let Some(nav) = archive.navigation_mut() {
                nav.set_doc_title(&title);
            }

            epub::writer::write_epub(&archive, &out_file)
                .with_context(|| format!("failed to write {}", out_file.display()))?;
            output.status(&format!("Created {}", out_file.display()));
            output.detail(&format!("  Identifier: {identifier}"));
        }
    }

    Ok(())
}

fn handle_asset(
    command: cli::asset::AssetCommand,
    options: &ArchiveOptions,
    output: &OutputConfig,
) -> Result<()> {
    use cli::asset::AssetCommand;

    match command {
        AssetCommand::List { file, r#type } => {
            let archive = open(&file, options)?;
            let rows: Vec<Vec<String>> = archive
                .store()
                .iter()
                .filter(|(_, doc)| !doc.kind().is_singleton())
                .filter(|(_, doc)| {
                    r#type
                        .as_deref()
                        .is_none_or(|t| asset_type(doc.kind()) == t)
                })
                .map(|(path, doc)| {
                    vec![
                        path.to_string(),
                        doc.media_type().to_string(),
                        format_size(doc.to_bytes().len()),
                    ]
                })
                .collect();

            if output.json {
                let items: Vec<_> = rows
                    .iter()
                    .map(|r| serde_json::json!({"path": r[0], "media_type": r[1], "size": r[2]}))
                    .collect();
                output.print_json(&items)?;
            } else {
                output.print_table(&["PATH", "TYPE", "SIZE"], &rows);
            }
        }
        AssetCommand::Rename {
            file,
            asset_path,
            new_name,
            output: out_file,
        } => {
            let new_path = modify_archive(&file, out_file.as_ref(), options, |archive| {
                let new_path = if new_name.contains('/') {
                    new_name.clone()
                } else {
                    epub::path::with_file_name(&asset_path, &new_name)
                };
                manipulate::rename(archive, &asset_path, &new_path)?;
                Ok(new_path)
            })
            .with_context(|| format!("renaming {asset_path} in {}", file.display()))?;

            if output.json {
                output.print_json(&serde_json::json!({"from": asset_path, "to": new_path}))?;
            } else {
                output.status(&format!("Renamed {asset_path} -> {new_path}"));
            }
        }
        AssetCommand::UnifyNames {
            file,
            output: out_file,
        } => {
            let renamed = modify_archive(&file, out_file.as_ref(), options, |archive| {
                manipulate::unify_image_names(archive)
            })
            .with_context(|| format!("unifying image names in {}", file.display()))?;
            print_renames(output, &renamed, "No colliding image names")?;
        }
        AssetCommand::AddExtensions {
            file,
            output: out_file,
        } => {
            let renamed = modify_archive(&file, out_file.as_ref(), options, |archive| {
                manipulate::add_missing_extensions(archive)
            })
            .with_context(|| format!("adding extensions in {}", file.display()))?;
            print_renames(output, &renamed, "No images without an extension")?;
        }
        AssetCommand::Add {
            file,
            asset,
            media_type,
            output: out_file,
        } => {
            let id = modify_archive(&file, out_file.as_ref(), options, |archive| {
                manipulate::asset_manage::add_file_from_disk(archive, &asset, media_type.as_deref())
            })
            .with_context(|| format!("adding {} to {}", asset.display(), file.display()))?;
            output.status(&format!("Added asset: {id}"));
        }
        AssetCommand::Remove {
            file,
            asset_path,
            output: out_file,
        } => {
            let removed = modify_archive(&file, out_file.as_ref(), options, |archive| {
                manipulate::asset_manage::remove_asset(archive, &asset_path)
            })
            .with_context(|| format!("removing {asset_path} from {}", file.display()))?;
            output.status(&format!("Removed asset: {removed}"));
        }
    }

    Ok(())
}

fn print_renames(output: &OutputConfig, renamed: &[(String, String)], none: &str) -> Result<()> {
    if output.json {
        let items: Vec<_> = renamed
            .iter()
            .map(|(from, to)| serde_json::json!({"from": from, "to": to}))
            .collect();
        output.print_json(&items)?;
    } else if renamed.is_empty() {
        output.status(none);
    } else {
        for (from, to) in renamed {
            output.status(&format!("{from} -> {to}"));
        }
    }
    Ok(())
}

fn handle_ids(
    command: cli::ids::IdsCommand,
    options: &ArchiveOptions,
    output: &OutputConfig,
) -> Result<()> {
    use cli::ids::IdsCommand;

    match command {
        IdsCommand::Duplicates { file } => {
            let archive = open(&file, options)?;
            let duplicates = manipulate::duplicate_ids(&archive);
            if output.json {
                output.print_json(&duplicates)?;
            } else if duplicates.is_empty() {
                output.status("No duplicate ids");
            } else {
                let rows: Vec<Vec<String>> = duplicates
                    .iter()
                    .map(|d| vec![d.id.clone(), d.sections.join(", ")])
                    .collect();
                output.print_table(&["ID", "SECTIONS"], &rows);
            }
        }
        IdsCommand::Unify {
            file,
            output: out_file,
        } => {
            let rewrites = modify_archive(&file, out_file.as_ref(), options, |archive| {
                manipulate::unify_ids(archive)
            })
            .with_context(|| format!("unifying ids in {}", file.display()))?;

            if output.json {
                output.print_json(&rewrites)?;
            } else if rewrites.is_empty() {
                output.status("No duplicate ids");
            } else {
                for r in &rewrites {
                    output.status(&format!("{}: {} -> {}", r.section, r.old_id, r.new_id));
                }
            }
        }
    }

    Ok(())
}

fn handle_toc(
    command: cli::toc::TocCommand,
    options: &ArchiveOptions,
    output: &OutputConfig,
) -> Result<()> {
    use cli::toc::TocCommand;

    match command {
        TocCommand::Show { file, depth } => {
            let archive = open(&file, options)?;
            let points = archive
                .navigation()
                .map(|nav| nav.nav_points())
                .unwrap_or_default();

            if output.json {
                output.print_json(&points)?;
            } else {
                fn print_toc(points: &[epub::NavPoint], indent: usize, max_depth: Option<usize>, verbose: bool) {
                    if let Some(max) = max_depth
                        && indent >= max
                    {
                        return;
                    }
                    for point in points {
                        let prefix = "  ".repeat(indent);
                        if verbose {
                            println!("{prefix}- {} ({})", point.label, point.src);
                        } else {
                            println!("{prefix}- {}", point.label);
                        }
                        print_toc(&point.children, indent + 1, max_depth, verbose);
                    }
                }
                print_toc(&points, 0, depth, output.verbose);
                output.detail(&format!("  {} entries", navigation::flatten(&points).len()));
            }
        }
    }

    Ok(())
}

fn handle_spine(
    command: cli::spine::SpineCommand,
    options: &ArchiveOptions,
    output: &OutputConfig,
) -> Result<()> {
    use cli::spine::SpineCommand;

    match command {
        SpineCommand::List { file } => {
            let archive = open(&file, options)?;
            let package = archive.require_package()?;

            let rows: Vec<Vec<String>> = package
                .spine_items()
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let href = package
                        .manifest_item_by_id(&item.idref)
                        .map_or("-".to_string(), |m| m.href);
                    vec![
                        i.to_string(),
                        item.idref.clone(),
                        href,
                        if item.is_linear() { "yes" } else { "no" }.to_string(),
                    ]
                })
                .collect();

            if output.json {
                let items: Vec<_> = rows
                    .iter()
                    .map(|r| serde_json::json!({"index": r[0], "idref": r[1], "href": r[2], "linear": r[3] == "yes"}))
                    .collect();
                output.print_json(&items)?;
            } else {
                output.print_table(&["#", "IDREF", "HREF", "LINEAR"], &rows);
            }
        }
    }

    Ok(())
}
