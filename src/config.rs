//! Preflight configuration
//!
//! Every field has a default matching the Proxy UI-SPEC conventions, so an
//! absent config file is the normal case.

use serde::{Deserialize, Serialize};

use crate::breakpoints::Breakpoint;
use crate::loader::{self, DocumentError};
use crate::tree::{self, SpecTree};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreflightConfig {
    /// Spec directory, relative to the project root.
    #[serde(default = "default_spec_dir")]
    pub spec_dir: String,
    /// Preflight report, written at the project root.
    #[serde(default = "default_report_file")]
    pub report_file: String,
    /// Asset reference scan report, written at the project root.
    #[serde(default = "default_references_report_file")]
    pub references_report_file: String,
    /// Manifest, written inside the spec directory.
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,
    #[serde(default = "default_expected_breakpoints")]
    pub expected_breakpoints: Vec<Breakpoint>,
    #[serde(default = "default_units")]
    pub units: String,
    #[serde(default = "default_color_space")]
    pub color_space: String,
    #[serde(default = "default_grid_columns")]
    pub grid_columns: u64,
    #[serde(default = "default_brand_colors")]
    pub brand_colors: Vec<String>,
    /// `typeStyle.family` value tolerated on non-text elements.
    #[serde(default = "default_placeholder_family")]
    pub placeholder_family: String,
}

fn default_spec_dir() -> String { "UI-SPEC".to_string() }
fn default_report_file() -> String { "preflight-results.json".to_string() }
fn default_references_report_file() -> String { "validation-results.json".to_string() }
fn default_manifest_file() -> String { "manifest.json".to_string() }
fn default_units() -> String { "px".to_string() }
fn default_color_space() -> String { "sRGB".to_string() }
fn default_grid_columns() -> u64 { 12 }
fn default_placeholder_family() -> String { "—".to_string() }

fn default_expected_breakpoints() -> Vec<Breakpoint> {
    vec![Breakpoint::from(360), Breakpoint::from(393), Breakpoint::from(430)]
}

fn default_brand_colors() -> Vec<String> {
    ["green", "green_alt", "purple", "black"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

impl Default for PreflightConfig {
    fn default() -> Self {
        Self {
            spec_dir: default_spec_dir(),
            report_file: default_report_file(),
            references_report_file: default_references_report_file(),
            manifest_file: default_manifest_file(),
            expected_breakpoints: default_expected_breakpoints(),
            units: default_units(),
            color_space: default_color_space(),
            grid_columns: default_grid_columns(),
            brand_colors: default_brand_colors(),
            placeholder_family: default_placeholder_family(),
        }
    }
}

impl PreflightConfig {
    pub fn load(tree: &dyn SpecTree, rel_path: &str) -> Result<Self, DocumentError> {
        loader::load_document(tree, rel_path)
    }

    /// Path of a spec document, relative to the project root.
    pub fn spec_path(&self, name: &str) -> String {
        tree::join(&self.spec_dir, name)
    }

    pub fn routes_dir(&self) -> String {
        self.spec_path("routes")
    }
}
