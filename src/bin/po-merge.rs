//! Merge Gettext PO catalogs with a POT template.
//!
//! Two forms are accepted: an explicit pair, updating one catalog in
//! place,
//!
//! ```text
//! po-merge po/it.po po/messages.pot
//! ```
//!
//! and a directory form, where the directory holds a single `*.pot`
//! template next to one `<locale>.po` file per locale:
//!
//! ```text
//! po-merge po              # merge every locale found
//! po-merge po --locale it  # merge one locale, creating it.po if needed
//! ```
//!
//! Files are rewritten only when the merged content differs from what is
//! on disk.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use log::info;
use po_merge::merge::{merge_dir, merge_file, MergeOptions};
use regex::Regex;

#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// A `.po` file to update, or a directory holding a `.pot` template
    /// and one `<locale>.po` file per locale.
    target: PathBuf,

    /// The `.pot` template; required when TARGET is a `.po` file.
    template: Option<PathBuf>,

    /// Merge a single locale; in the directory form its `.po` file is
    /// created when missing.
    #[arg(long)]
    locale: Option<String>,

    /// Regex over reference file paths; stale messages with a matching
    /// reference are kept instead of purged.
    #[arg(long, value_name = "REGEX")]
    purge_exclude: Option<String>,

    /// Minimum similarity score (0.0 to 1.0) for carrying a translation
    /// over from a renamed message as fuzzy.
    #[arg(long, default_value_t = 0.8)]
    fuzzy_threshold: f64,
}

fn build_options(args: &Args) -> anyhow::Result<MergeOptions> {
    let purge_exclude = args
        .purge_exclude
        .as_deref()
        .map(Regex::new)
        .transpose()
        .context("Invalid --purge-exclude pattern")?;
    Ok(MergeOptions {
        purge_exclude,
        fuzzy_threshold: args.fuzzy_threshold,
        ..MergeOptions::default()
    })
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}

/// The locale a PO file belongs to, taken from its file name.
fn locale_of(po_path: &Path) -> anyhow::Result<String> {
    po_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(String::from)
        .with_context(|| format!("Cannot determine locale from {}", po_path.display()))
}

fn run(args: &Args, opts: &MergeOptions) -> anyhow::Result<()> {
    match &args.template {
        Some(template) => {
            if !has_extension(&args.target, "po") {
                bail!("Expected a .po file, got {}", args.target.display());
            }
            if !has_extension(template, "pot") {
                bail!("Expected a .pot template, got {}", template.display());
            }
            if !args.target.is_file() {
                bail!("No such file: {}", args.target.display());
            }
            let locale = match &args.locale {
                Some(locale) => locale.clone(),
                None => locale_of(&args.target)?,
            };
            if merge_file(&args.target, template, &locale, opts)? {
                info!("Wrote {}", args.target.display());
            }
        }
        None => {
            if !args.target.is_dir() {
                bail!("Not a directory: {}", args.target.display());
            }
            merge_dir(&args.target, args.locale.as_deref(), opts)?;
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().filter_or("RUST_LOG", "info"));
    let args = Args::parse();
    // An invalid pattern fails here, before any file is touched.
    let opts = build_options(&args)?;
    run(&args, &opts)
}
