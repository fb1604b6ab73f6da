//! Spec documents
//!
//! One struct per document kind. Every field is optional: presence is a
//! validation concern, not a parse concern, so a half-written document still
//! loads and produces precise issues instead of a single parse failure.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::breakpoints::Breakpoint;

pub type Yaml = serde_yaml::Value;

/// A value "counts" when it carries content: null, `false`, `0` and `""` do not.
pub fn is_meaningful(value: &Yaml) -> bool {
    match value {
        Yaml::Null => false,
        Yaml::Bool(b) => *b,
        Yaml::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Yaml::String(s) => !s.is_empty(),
        Yaml::Sequence(_) | Yaml::Mapping(_) | Yaml::Tagged(_) => true,
    }
}

pub fn present(value: Option<&Yaml>) -> bool {
    value.map_or(false, is_meaningful)
}

pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Short textual rendering of a scalar for messages.
pub fn describe(value: Option<&Yaml>) -> String {
    match value {
        None | Some(Yaml::Null) => "nothing".to_string(),
        Some(Yaml::String(s)) => s.clone(),
        Some(Yaml::Number(n)) => n.to_string(),
        Some(Yaml::Bool(b)) => b.to_string(),
        Some(other) => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_else(|_| "<unprintable>".to_string()),
    }
}

/// Text of a scalar. Numbers and booleans are rendered the way YAML wrote them.
pub fn scalar_text(value: &Yaml) -> Option<String> {
    match value {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Number(n) => Some(n.to_string()),
        Yaml::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Text fields accept any scalar, so `units: 1` or `id: 7` reach the rules
/// instead of failing the whole document. Non-scalars decode as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Yaml>::deserialize(deserializer)?
        .as_ref()
        .and_then(scalar_text))
}

// --- meta.yml ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaConfig {
    #[serde(default, deserialize_with = "lenient_text")]
    pub project: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub units: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub color_space: Option<String>,
    pub breakpoints: Option<Vec<Breakpoint>>,
}

// --- tokens.yml ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenSet {
    pub colors: Option<ColorTokens>,
    pub typography: Option<Yaml>,
    pub spacing: Option<Yaml>,
    pub radii: Option<Yaml>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColorTokens {
    pub brand: Option<BTreeMap<String, Yaml>>,
    pub surface: Option<Yaml>,
    pub text: Option<Yaml>,
}

// --- grid.yml ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridConfig {
    pub columns: Option<Yaml>,
    pub container: Option<GridContainer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridContainer {
    pub widths: Option<BTreeMap<Breakpoint, Yaml>>,
}

// --- motion.yml ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MotionConfig {
    pub defaults: Option<MotionDefaults>,
    pub policy: Option<Yaml>,
    pub presets: Option<Yaml>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MotionDefaults {
    pub duration: Option<Yaml>,
    pub easing: Option<Yaml>,
}

// --- assets.yml ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Svg,
    Png,
    Lottie,
}

impl AssetKind {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "svg" => Some(AssetKind::Svg),
            "png" => Some(AssetKind::Png),
            "lottie" => Some(AssetKind::Lottie),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AssetRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", rename = "type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub path: Option<String>,
    pub intrinsic: Option<Yaml>,
}

impl AssetRecord {
    pub fn asset_kind(&self) -> Option<AssetKind> {
        self.kind.as_deref().and_then(AssetKind::parse)
    }
}

// --- registry.yml ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteRegistry {
    pub routes: Option<Vec<RegistryEntry>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RegistryEntry {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub path: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub purpose: Option<String>,
}

impl RegistryEntry {
    /// Does this entry describe the route directory `dir`?
    pub fn matches_dir(&self, dir: &str) -> bool {
        let by_id = self
            .id
            .as_deref()
            .map_or(false, |id| id == dir || id.strip_prefix("auth.") == Some(dir));
        let by_path = self
            .path
            .as_deref()
            .map_or(false, |p| p.strip_prefix('/') == Some(dir));
        by_id || by_path
    }
}

// --- routes/<name>/route.yml ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteDoc {
    #[serde(default, deserialize_with = "lenient_text")]
    pub route: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub summary: Option<String>,
}

// --- routes/<name>/slices/*.yml ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slice {
    #[serde(default, deserialize_with = "lenient_text")]
    pub slice_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub route: Option<String>,
    pub overlays: Option<BTreeMap<Breakpoint, Yaml>>,
    pub elements: Option<Vec<Element>>,
    pub acceptance: Option<Acceptance>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Acceptance {
    pub breakpoints: Option<Vec<Breakpoint>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub asset: Option<String>,
    #[serde(rename = "box")]
    pub geometry: Option<BTreeMap<Breakpoint, Yaml>>,
    pub type_style: Option<TypeStyle>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TypeStyle {
    #[serde(default, deserialize_with = "lenient_text")]
    pub family: Option<String>,
}

impl Element {
    /// Element id, or its position when the id is absent.
    pub fn label(&self, index: usize) -> String {
        match non_empty(&self.id) {
            Some(id) => id.to_string(),
            None => format!("element[{}]", index),
        }
    }
}
