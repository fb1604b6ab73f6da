//! Manifest Generator
//!
//! Aggregates project state (assets, routes, slices, overlays, readiness)
//! into `manifest.json`. Counts only; correctness is preflight's job.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::assets::ASSETS_FILE;
use crate::breakpoints::Breakpoint;
use crate::config::PreflightConfig;
use crate::documents::{non_empty, AssetKind, MetaConfig, RouteDoc, RouteRegistry};
use crate::hashing::content_hash;
use crate::loader::{self, DocumentError};
use crate::preflight::META_FILE;
use crate::routes::{planned_routes, registry_entry_for, REGISTRY_FILE};
use crate::tree::{self, SpecTree};

pub const MANIFEST_VERSION: &str = "1.0.0";

const CORE_DOCUMENTS: [&str; 7] = [
    "meta.yml",
    "tokens.yml",
    "grid.yml",
    "motion.yml",
    "assets.yml",
    "registry.yml",
    "fonts.yml",
];

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("{path}: {source}")]
    Document {
        path: String,
        #[source]
        source: DocumentError,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to write manifest to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<DocumentError> for ManifestError {
    fn from(source: DocumentError) -> Self {
        ManifestError::Document {
            path: source.path().to_string(),
            source,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub version: String,
    pub generated: String,
    /// Hash of everything below, so unchanged trees hash identically.
    pub content_hash: String,
    #[serde(flatten)]
    pub body: ManifestBody,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManifestBody {
    pub project: ProjectSummary,
    pub spec: SpecSummary,
    pub assets: AssetSummary,
    pub routes: RouteSummary,
    pub slices: CountSummary,
    pub overlays: CountSummary,
    pub readiness: Readiness,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub breakpoints: Vec<Breakpoint>,
    pub units: String,
    pub color_space: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpecSummary {
    pub root: String,
    /// Core documents present in the spec directory.
    pub core: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct AssetTypeCounts {
    pub svg: usize,
    pub png: usize,
    pub lottie: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetSummary {
    pub total: usize,
    pub by_type: AssetTypeCounts,
    pub catalog: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteDetail {
    pub status: String,
    pub slices: usize,
    pub overlays: usize,
    pub path: String,
    pub kind: String,
    pub purpose: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub total: usize,
    pub implemented: usize,
    pub planned: usize,
    pub details: BTreeMap<String, RouteDetail>,
    pub planned_list: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CountSummary {
    pub total: usize,
    pub per_route: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Readiness {
    pub code_gen: bool,
    pub production: bool,
    pub coverage: String,
}

/// Build the manifest. meta.yml and registry.yml are required.
pub fn generate_manifest(
    tree: &dyn SpecTree,
    config: &PreflightConfig,
    generated_at: DateTime<Utc>,
) -> Result<Manifest, ManifestError> {
    let meta: MetaConfig = loader::load_document(tree, &config.spec_path(META_FILE))?;
    let registry: RouteRegistry = loader::load_document(tree, &config.spec_path(REGISTRY_FILE))?;
    let entries = registry.routes.unwrap_or_default();

    let assets = summarize_assets(tree, config)?;

    let routes_dir = config.routes_dir();
    let implemented = tree.list_dirs(&routes_dir);
    let mut details = BTreeMap::new();
    let mut slices = CountSummary::default();
    let mut overlays = CountSummary::default();

    for name in &implemented {
        let route_dir = tree::join(&routes_dir, name);
        let slice_count = tree.list_files(&tree::join(&route_dir, "slices"), "yml").len();
        let overlay_count = tree.list_files(&tree::join(&route_dir, "overlays"), "png").len();

        let route_doc_path = tree::join(&route_dir, "route.yml");
        let route_doc = if tree.exists(&route_doc_path) {
            loader::load_document::<RouteDoc>(tree, &route_doc_path)
                .map_err(|err| warn!(route = %name, error = %err, "could not parse route.yml"))
                .ok()
        } else {
            None
        };
        let entry = registry_entry_for(&entries, name);

        let path = route_doc
            .as_ref()
            .and_then(|d| non_empty(&d.route))
            .or_else(|| entry.and_then(|e| non_empty(&e.path)))
            .map(str::to_string)
            .unwrap_or_else(|| format!("/{}", name));
        let kind = entry
            .and_then(|e| non_empty(&e.kind))
            .unwrap_or("screen")
            .to_string();
        let purpose = entry
            .and_then(|e| non_empty(&e.purpose))
            .or_else(|| route_doc.as_ref().and_then(|d| non_empty(&d.summary)))
            .unwrap_or_default()
            .to_string();

        details.insert(
            name.clone(),
            RouteDetail {
                status: "implemented".to_string(),
                slices: slice_count,
                overlays: overlay_count,
                path,
                kind,
                purpose,
            },
        );
        slices.total += slice_count;
        slices.per_route.insert(name.clone(), slice_count);
        overlays.total += overlay_count;
        overlays.per_route.insert(name.clone(), overlay_count);
    }

    let registered = entries.iter().filter(|e| non_empty(&e.id).is_some()).count();
    let planned_list = planned_routes(&entries, &implemented);

    let readiness = Readiness {
        code_gen: implemented.len() >= 2 && assets.total >= 10,
        production: implemented.len() == registered,
        coverage: format!("{}/{} routes", implemented.len(), registered),
    };

    let body = ManifestBody {
        project: ProjectSummary {
            name: non_empty(&meta.project).unwrap_or("Proxy").to_string(),
            description: meta.description.clone(),
            breakpoints: meta
                .breakpoints
                .clone()
                .unwrap_or_else(|| config.expected_breakpoints.clone()),
            units: meta.units.clone().unwrap_or_else(|| config.units.clone()),
            color_space: meta
                .color_space
                .clone()
                .unwrap_or_else(|| config.color_space.clone()),
        },
        spec: SpecSummary {
            root: format!("{}/", config.spec_dir.trim_end_matches('/')),
            core: CORE_DOCUMENTS
                .iter()
                .filter(|doc| tree.exists(&config.spec_path(doc)))
                .map(|doc| doc.to_string())
                .collect(),
        },
        assets,
        routes: RouteSummary {
            total: registered,
            implemented: implemented.len(),
            planned: planned_list.len(),
            details,
            planned_list,
        },
        slices,
        overlays,
        readiness,
    };

    let content_hash = content_hash(&body)?;
    info!(
        routes = body.routes.implemented,
        slices = body.slices.total,
        assets = body.assets.total,
        "manifest generated"
    );

    Ok(Manifest {
        version: MANIFEST_VERSION.to_string(),
        generated: generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        content_hash,
        body,
    })
}

fn summarize_assets(tree: &dyn SpecTree, config: &PreflightConfig) -> Result<AssetSummary, ManifestError> {
    let entries = loader::load_asset_entries(tree, &config.spec_path(ASSETS_FILE))?;
    let mut by_type = AssetTypeCounts::default();
    for record in entries.iter().filter_map(|e| e.record.as_ref().ok()) {
        match record.asset_kind() {
            Some(AssetKind::Svg) => by_type.svg += 1,
            Some(AssetKind::Png) => by_type.png += 1,
            Some(AssetKind::Lottie) => by_type.lottie += 1,
            None => {}
        }
    }
    Ok(AssetSummary {
        total: entries.len(),
        by_type,
        catalog: ASSETS_FILE.to_string(),
    })
}

pub fn write_manifest(manifest: &Manifest, path: &Path) -> Result<(), ManifestError> {
    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(path, json + "\n").map_err(|source| ManifestError::Write {
        path: path.to_path_buf(),
        source,
    })
}
