//! Asset Reference Scan
//!
//! A narrower pass than preflight: are all catalog files on disk, and does
//! every slice element point at a catalog id. Shares the catalog loader with
//! preflight so both agree on what the catalog contains.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::assets::ASSETS_FILE;
use crate::config::PreflightConfig;
use crate::documents::{non_empty, Slice};
use crate::loader::{self, DocumentError};
use crate::report::{Category, Report};
use crate::tree::{self, SpecTree};

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceCounts {
    pub assets_defined: usize,
    pub missing_files: usize,
    pub references_total: usize,
    pub references_invalid: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceScan {
    pub counts: ReferenceCounts,
    pub report: Report,
}

/// Scan asset files and element references. Fails only when the asset
/// catalog itself cannot be read.
pub fn scan_references(
    tree: &dyn SpecTree,
    config: &PreflightConfig,
) -> Result<ReferenceScan, DocumentError> {
    let entries = loader::load_asset_entries(tree, &config.spec_path(ASSETS_FILE))?;
    let mut scan = ReferenceScan::default();

    let mut known: BTreeSet<String> = BTreeSet::new();
    for entry in entries {
        let Ok(record) = entry.record else { continue };
        let Some(id) = non_empty(&record.id) else { continue };
        if !known.insert(id.to_string()) {
            continue;
        }

        let path = non_empty(&record.path).unwrap_or_default();
        if path.is_empty() || !tree.exists(path) {
            scan.report.error(
                Category::AssetFile,
                ASSETS_FILE,
                format!("Asset \"{}\" references non-existent file: {}", id, path),
            );
            scan.counts.missing_files += 1;
        }
    }
    scan.counts.assets_defined = known.len();

    let routes_dir = config.routes_dir();
    for route in tree.list_dirs(&routes_dir) {
        let slices_dir = tree::join(&tree::join(&routes_dir, &route), "slices");
        for file_name in tree.list_files(&slices_dir, "yml") {
            let rel = format!("routes/{}/slices/{}", route, file_name);
            // Malformed slices are preflight's concern.
            let Ok(slice) = loader::load_document::<Slice>(tree, &tree::join(&slices_dir, &file_name)) else {
                debug!(slice = %rel, "skipping unparseable slice");
                continue;
            };

            for (index, element) in slice.elements.iter().flatten().enumerate() {
                let Some(asset) = non_empty(&element.asset) else { continue };
                scan.counts.references_total += 1;
                if !known.contains(asset) {
                    scan.report.error(
                        Category::AssetRef,
                        &rel,
                        format!("{}: references undefined asset: \"{}\"", element.label(index), asset),
                    );
                    scan.counts.references_invalid += 1;
                }
            }
        }
    }

    info!(
        assets = scan.counts.assets_defined,
        references = scan.counts.references_total,
        invalid = scan.counts.references_invalid,
        "asset references scanned"
    );
    Ok(scan)
}
