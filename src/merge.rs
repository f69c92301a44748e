// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! This file contains main logic used by the binary `po-merge`.
//!
//! The merge engine reconciles an existing locale catalog with an
//! authoritative POT template: human-entered translations survive, while
//! the message inventory, ordering, comments and references follow the
//! template. Messages whose `msgid` drifted are carried over from the
//! closest existing match and marked fuzzy; messages the template no
//! longer knows are purged unless a reference path matches the
//! configured exclusion pattern.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use log::{info, warn};
use regex::Regex;

use crate::catalog::{Catalog, Message, PluralTranslation, Translation};
use crate::po_file;

/// Tunables for a merge run.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Stale messages with a reference path matching this pattern are
    /// kept instead of purged. `None` protects nothing.
    pub purge_exclude: Option<Regex>,
    /// String similarity metric used for fuzzy matching, scored
    /// `0.0..=1.0`.
    pub similarity: fn(&str, &str) -> f64,
    /// Minimum similarity score for a fuzzy carry-over.
    pub fuzzy_threshold: f64,
}

impl Default for MergeOptions {
    fn default() -> Self {
        MergeOptions {
            purge_exclude: None,
            similarity: strsim::jaro,
            fuzzy_threshold: 0.8,
        }
    }
}

/// Merge `template` with an optional `existing` catalog for `locale`.
///
/// The result is a fresh catalog: the template's messages in template
/// order, each taking its translation from the best existing match,
/// followed by the protected leftovers in their original relative
/// order. Neither input is modified. When there is no existing catalog
/// the header is synthesized as `Language: <locale>`; otherwise the
/// existing header is kept unchanged.
pub fn merge(
    template: &Catalog,
    existing: Option<&Catalog>,
    locale: &str,
    opts: &MergeOptions,
) -> Catalog {
    let mut available: Vec<Option<&Message>> = existing
        .map(|catalog| catalog.messages.iter().map(Some).collect())
        .unwrap_or_default();

    let mut messages = Vec::with_capacity(template.messages.len());
    for new in &template.messages {
        let exact = available
            .iter()
            .position(|slot| slot.is_some_and(|old| old.is_same(new)));
        if let Some(idx) = exact {
            let old = available[idx].take().unwrap();
            messages.push(merge_matching(new, old));
        } else if let Some(idx) = best_fuzzy_match(new, &available, opts) {
            let old = available[idx].take().unwrap();
            messages.push(merge_fuzzy(new, old));
        } else {
            messages.push(untranslated(new));
        }
    }

    // Whatever the template no longer references is purged, except for
    // messages the exclusion pattern protects.
    if let Some(exclude) = &opts.purge_exclude {
        for old in available.into_iter().flatten() {
            if old.is_protected(exclude) {
                messages.push(old.clone());
            }
        }
    }

    let header = match existing {
        Some(catalog) => catalog.header.clone(),
        None => vec![format!("Language: {locale}\n")],
    };
    Catalog { header, messages }
}

/// Exact match: the template is authoritative for everything derived
/// from source code, the existing message for the translation itself.
/// An exact content match is no longer fuzzy.
fn merge_matching(new: &Message, old: &Message) -> Message {
    let mut flags = old.flags().clone();
    flags.remove("fuzzy");
    compose(new, old, flags)
}

/// Fuzzy match: like an exact match, but flagged for human review.
fn merge_fuzzy(new: &Message, old: &Message) -> Message {
    compose(new, old, old.flags().clone()).mark_as_fuzzy()
}

fn compose(new: &Message, old: &Message, flags: BTreeSet<String>) -> Message {
    match (new, old) {
        (Message::Singular(new), Message::Singular(old)) => Message::Singular(Translation {
            msgid: new.msgid.clone(),
            msgstr: old.msgstr.clone(),
            comments: new.comments.clone(),
            flags,
            references: new.references.clone(),
            source_line: new.source_line,
        }),
        (Message::Plural(new), Message::Plural(old)) => Message::Plural(PluralTranslation {
            msgid: new.msgid.clone(),
            msgid_plural: new.msgid_plural.clone(),
            msgstr: old.msgstr.clone(),
            comments: new.comments.clone(),
            flags,
            references: new.references.clone(),
            source_line: new.source_line,
        }),
        _ => unreachable!("matches are always of the same kind"),
    }
}

/// A template message with no match at all: empty translation, no
/// flags.
fn untranslated(new: &Message) -> Message {
    match new {
        Message::Singular(translation) => Message::Singular(Translation {
            msgid: translation.msgid.clone(),
            msgstr: vec![String::new()],
            comments: translation.comments.clone(),
            flags: BTreeSet::new(),
            references: translation.references.clone(),
            source_line: translation.source_line,
        }),
        Message::Plural(translation) => Message::Plural(PluralTranslation {
            msgid: translation.msgid.clone(),
            msgid_plural: translation.msgid_plural.clone(),
            msgstr: translation
                .msgstr
                .keys()
                .map(|&index| (index, vec![String::new()]))
                .collect(),
            comments: translation.comments.clone(),
            flags: BTreeSet::new(),
            references: translation.references.clone(),
            source_line: translation.source_line,
        }),
    }
}

/// Index of the available same-kind message most similar to `new`,
/// provided its score reaches the threshold. Ties break to the earliest
/// position in the existing catalog.
fn best_fuzzy_match(
    new: &Message,
    available: &[Option<&Message>],
    opts: &MergeOptions,
) -> Option<usize> {
    let msgid = new.msgid();
    let mut best: Option<(usize, f64)> = None;
    for (idx, old) in available.iter().enumerate() {
        let Some(old) = old else { continue };
        if !same_kind(new, old) {
            continue;
        }
        let score = (opts.similarity)(&msgid, &old.msgid());
        if score >= opts.fuzzy_threshold && best.map_or(true, |(_, top)| score > top) {
            best = Some((idx, score));
        }
    }
    best.map(|(idx, _)| idx)
}

fn same_kind(a: &Message, b: &Message) -> bool {
    matches!(
        (a, b),
        (Message::Singular(_), Message::Singular(_)) | (Message::Plural(_), Message::Plural(_))
    )
}

/// Merge `pot_path` into `po_path`, writing only when the rendered
/// result differs byte-for-byte from what is on disk. Returns whether a
/// write happened.
pub fn merge_file(
    po_path: &Path,
    pot_path: &Path,
    locale: &str,
    opts: &MergeOptions,
) -> anyhow::Result<bool> {
    let template = po_file::parse(pot_path)?;
    let current = if po_path.exists() {
        Some(
            fs::read_to_string(po_path)
                .with_context(|| format!("Failed to read {}", po_path.display()))?,
        )
    } else {
        None
    };
    let existing = current
        .as_deref()
        .map(po_file::parse_str)
        .transpose()
        .with_context(|| format!("Could not parse {} as PO file", po_path.display()))?;

    let merged = merge(&template, existing.as_ref(), locale, opts);
    let rendered = po_file::dump(&merged);
    if current.as_deref() == Some(rendered.as_str()) {
        return Ok(false);
    }
    fs::write(po_path, &rendered).with_context(|| format!("Failed to write {}", po_path.display()))?;
    Ok(true)
}

/// Merge every locale in `dir` against the directory's single `*.pot`
/// template. The directory holds one `<locale>.po` file per locale;
/// with `locale` given, only that locale is merged and its file is
/// created when missing. Returns the paths that were written; files
/// whose content did not change are left alone.
pub fn merge_dir(
    dir: &Path,
    locale: Option<&str>,
    opts: &MergeOptions,
) -> anyhow::Result<Vec<PathBuf>> {
    let pot_path = find_template(dir)?;
    let targets = match locale {
        Some(locale) => vec![(dir.join(format!("{locale}.po")), locale.to_string())],
        None => {
            let mut targets = Vec::new();
            for entry in fs::read_dir(dir)
                .with_context(|| format!("Failed to read directory {}", dir.display()))?
            {
                let path = entry?.path();
                if path.extension().is_some_and(|ext| ext == "po") {
                    let locale = path
                        .file_stem()
                        .map(|stem| stem.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    targets.push((path, locale));
                }
            }
            // Locale discovery order comes from the filesystem.
            targets.sort();
            targets
        }
    };
    if targets.is_empty() {
        warn!("No locale files found in {}", dir.display());
    }

    let mut written = Vec::new();
    for (po_path, locale) in targets {
        if merge_file(&po_path, &pot_path, &locale, opts)? {
            info!("Wrote {}", po_path.display());
            written.push(po_path);
        }
    }
    Ok(written)
}

fn find_template(dir: &Path) -> anyhow::Result<PathBuf> {
    let mut templates = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))?
    {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "pot") {
            templates.push(path);
        }
    }
    templates.sort();
    match templates.len() {
        0 => bail!("No .pot template found in {}", dir.display()),
        1 => Ok(templates.remove(0)),
        _ => bail!(
            "Expected a single .pot template in {}, found {}",
            dir.display(),
            templates.len()
        ),
    }
}
