//! Collision-safe export of fetched reports.
//!
//! Reports are copied out of their temp files under their original archive
//! entry names. Several archives can carry the same entry name, so names
//! shared by more than one entry are numbered: `x.csv` twice becomes
//! `x (1).csv` and `x (2).csv`.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use playreports_core::{ExportMapping, ReportsError};
use tracing::{debug, info, instrument};

/// Name used when a display name has no file name component.
const FALLBACK_NAME: &str = "report.csv";

/// Renames entries in place so every display name is a unique file name.
///
/// Names are first reduced to their last path component. Entries sharing a
/// name become `<base> (<n>)<ext>` with `n` counting from 1 in insertion
/// order; candidates already used by another entry are skipped. Entries with
/// a unique name keep it.
pub fn resolve_collisions(mapping: &mut ExportMapping) {
    for entry in mapping.entries_mut() {
        entry.display_name = file_name_of(&entry.display_name);
    }

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, entry) in mapping.entries().iter().enumerate() {
        groups
            .entry(entry.display_name.clone())
            .or_insert_with(|| {
                order.push(entry.display_name.clone());
                Vec::new()
            })
            .push(idx);
    }

    let mut taken: HashSet<String> = groups
        .iter()
        .filter(|(_, members)| members.len() == 1)
        .map(|(name, _)| name.clone())
        .collect();

    let entries = mapping.entries_mut();
    for name in order {
        let members = &groups[&name];
        if members.len() < 2 {
            continue;
        }

        let (base, ext) = split_extension(&name);
        let mut n = 1usize;
        for &idx in members {
            let renamed = loop {
                let candidate = format!("{base} ({n}){ext}");
                n += 1;
                if !taken.contains(&candidate) {
                    break candidate;
                }
            };
            debug!(from = %name, to = %renamed, "Renamed colliding export");
            taken.insert(renamed.clone());
            entries[idx].display_name = renamed;
        }
    }
}

/// Copies every entry into `destination`, overwriting existing files.
///
/// Collisions are resolved first. Returns the written paths in mapping order.
#[instrument(skip(mapping), fields(destination = %destination.display(), count = mapping.len()))]
pub async fn export(
    mapping: &ExportMapping,
    destination: &Path,
) -> Result<Vec<PathBuf>, ReportsError> {
    let mut resolved = mapping.clone();
    resolve_collisions(&mut resolved);

    tokio::fs::create_dir_all(destination).await?;

    let mut written = Vec::with_capacity(resolved.len());
    for entry in resolved.entries() {
        let target = destination.join(&entry.display_name);
        tokio::fs::copy(&entry.source, &target).await?;
        debug!(source = %entry.source.display(), target = %target.display(), "Exported report");
        written.push(target);
    }

    info!(count = written.len(), "Reports exported");
    Ok(written)
}

fn file_name_of(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}

/// Splits `name` into base and extension, keeping the dot with the extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(idx) => name.split_at(idx),
    }
}

// ============================================================================
// Tests
// ============================================================================
