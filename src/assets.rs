//! Asset Catalog Index
//!
//! Built once per run from the asset entries, read-only afterwards. Downstream
//! components only ask whether an id is known.

use std::collections::BTreeMap;

use tracing::debug;

use crate::documents::{non_empty, present, AssetRecord};
use crate::loader::AssetEntry;
use crate::report::{Category, Report};
use crate::tree::ResourceResolver;

pub const ASSETS_FILE: &str = "assets.yml";

#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    records: BTreeMap<String, AssetRecord>,
}

impl AssetCatalog {
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&AssetRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index the entries, recording issues for every defect found along the way.
    ///
    /// The first record for an id wins; each later duplicate is one error.
    /// A record whose file is missing stays in the catalog.
    pub fn build(
        entries: Vec<AssetEntry>,
        resolver: &dyn ResourceResolver,
        report: &mut Report,
    ) -> Self {
        let mut catalog = Self::default();
        let cat = Category::Assets;

        for entry in entries {
            let record = match entry.record {
                Ok(record) => record,
                Err(err) => {
                    report.error(
                        cat,
                        ASSETS_FILE,
                        format!("Asset entry {}: parse error: {}", entry.index, err),
                    );
                    continue;
                }
            };
            let Some(id) = non_empty(&record.id).map(str::to_string) else {
                continue;
            };

            let duplicate = catalog.records.contains_key(&id);
            if duplicate {
                report.error(cat, ASSETS_FILE, format!("Duplicate asset ID: {}", id));
            }
            check_record(&id, &record, resolver, report);
            if !duplicate {
                catalog.records.insert(id, record);
            }
        }

        if catalog.is_empty() {
            report.warning(cat, ASSETS_FILE, "No assets found - check file format");
        }
        debug!(assets = catalog.len(), "asset catalog indexed");
        catalog
    }
}

fn check_record(id: &str, record: &AssetRecord, resolver: &dyn ResourceResolver, report: &mut Report) {
    let cat = Category::Assets;

    match non_empty(&record.kind) {
        None => report.error(cat, ASSETS_FILE, format!("Asset {}: missing type", id)),
        Some(kind) if record.asset_kind().is_none() => report.warning(
            cat,
            ASSETS_FILE,
            format!("Asset {}: unrecognized type \"{}\"", id, kind),
        ),
        Some(_) => {}
    }

    let path = non_empty(&record.path);
    if path.is_none() {
        report.error(cat, ASSETS_FILE, format!("Asset {}: missing path", id));
    }
    if !present(record.intrinsic.as_ref()) {
        report.warning(cat, ASSETS_FILE, format!("Asset {}: missing intrinsic dimensions", id));
    }

    if let Some(path) = path {
        if !resolver.exists(path) {
            report.error(cat, ASSETS_FILE, format!("Asset {}: file not found at {}", id, path));
        }
        if let Some(ext) = doubled_extension(path) {
            report.error(
                cat,
                ASSETS_FILE,
                format!("Asset {}: double .{}.{} extension in path", id, ext, ext),
            );
        }
    }
}

/// The known export corruption: a file name ending in its extension twice
/// (`icon.svg.svg`). Returns the repeated extension.
pub fn doubled_extension(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next().unwrap_or(path);
    let mut parts = name.rsplit('.');
    let last = parts.next()?;
    let previous = parts.next()?;
    // Require a stem before the doubled pair.
    parts.next()?;
    (!last.is_empty() && last.eq_ignore_ascii_case(previous)).then_some(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_asset_entries;
    use crate::tree::MemoryTree;

    fn build(assets_yaml: &str, tree: MemoryTree) -> (AssetCatalog, Report) {
        let tree = tree.with_file("UI-SPEC/assets.yml", assets_yaml);
        let entries = load_asset_entries(&tree, "UI-SPEC/assets.yml").unwrap();
        let mut report = Report::new();
        let catalog = AssetCatalog::build(entries, &tree, &mut report);
        (catalog, report)
    }

    #[test]
    fn test_complete_record_is_clean() {
        let tree = MemoryTree::new().with_file("assets/icon_home.svg", "<svg/>");
        let (catalog, report) = build(
            "- id: icon_home\n  type: svg\n  path: assets/icon_home.svg\n  intrinsic: { w: 24, h: 24 }\n",
            tree,
        );
        assert!(report.is_empty(), "{:?}", report);
        assert!(catalog.contains("icon_home"));
    }

    #[test]
    fn test_missing_file_keeps_record_in_catalog() {
        let (catalog, report) = build(
            "- id: icon_home\n  type: svg\n  path: assets/icon_home.svg\n  intrinsic: { w: 24, h: 24 }\n",
            MemoryTree::new(),
        );
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0].message,
            "Asset icon_home: file not found at assets/icon_home.svg"
        );
        assert!(catalog.contains("icon_home"));
    }

    #[test]
    fn test_duplicate_first_occurrence_wins() {
        let tree = MemoryTree::new()
            .with_file("assets/a.svg", "")
            .with_file("assets/b.svg", "");
        let (catalog, report) = build(
            r#"
- { id: logo, type: svg, path: assets/a.svg, intrinsic: { w: 1, h: 1 } }
- { id: logo, type: svg, path: assets/b.svg, intrinsic: { w: 1, h: 1 } }
- { id: logo, type: svg, path: assets/b.svg, intrinsic: { w: 1, h: 1 } }
"#,
            tree,
        );
        let dupes: Vec<_> = report
            .errors
            .iter()
            .filter(|i| i.message == "Duplicate asset ID: logo")
            .collect();
        assert_eq!(dupes.len(), 2);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("logo").unwrap().path.as_deref(), Some("assets/a.svg"));
    }

    #[test]
    fn test_missing_fields() {
        let (_, report) = build("- id: bare\n", MemoryTree::new());
        let errors: Vec<_> = report.errors.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(errors, vec!["Asset bare: missing type", "Asset bare: missing path"]);
        assert_eq!(
            report.warnings[0].message,
            "Asset bare: missing intrinsic dimensions"
        );
    }

    #[test]
    fn test_entries_without_id_are_skipped() {
        let (catalog, report) = build("- type: svg\n- id: \"\"\n", MemoryTree::new());
        assert!(catalog.is_empty());
        assert!(report.errors.is_empty());
        assert_eq!(report.warnings[0].message, "No assets found - check file format");
    }

    #[test]
    fn test_doubled_extension_detection() {
        assert_eq!(doubled_extension("assets/icon.svg.svg"), Some("svg"));
        assert_eq!(doubled_extension("assets/photo.PNG.png"), Some("png"));
        assert_eq!(doubled_extension("assets/icon.svg"), None);
        assert_eq!(doubled_extension("assets/svg.svg"), None);
        assert_eq!(doubled_extension("assets/icon.min.svg"), None);
    }

    #[test]
    fn test_doubled_extension_is_an_error() {
        let tree = MemoryTree::new().with_file("assets/icon.svg.svg", "");
        let (_, report) = build(
            "- { id: icon, type: svg, path: assets/icon.svg.svg, intrinsic: { w: 1, h: 1 } }\n",
            tree,
        );
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].message, "Asset icon: double .svg.svg extension in path");
    }

    #[test]
    fn test_unrecognized_type_is_a_warning() {
        let tree = MemoryTree::new().with_file("assets/a.gif", "");
        let (catalog, report) = build(
            "- { id: a, type: gif, path: assets/a.gif, intrinsic: { w: 1, h: 1 } }\n",
            tree,
        );
        assert!(report.errors.is_empty());
        assert_eq!(report.warnings[0].message, "Asset a: unrecognized type \"gif\"");
        assert!(catalog.contains("a"));
    }
}
