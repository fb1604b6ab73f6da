//! Route/Slice Validator
//!
//! Walks every route directory on disk, validates each slice against the
//! canonical breakpoints and the asset catalog, and cross-references the
//! registry. A slice that fails to parse is one error; its siblings are still
//! validated.

use serde::Serialize;
use tracing::{debug, info};

use crate::assets::AssetCatalog;
use crate::breakpoints::{format_list, BreakpointAuthority};
use crate::config::PreflightConfig;
use crate::documents::{non_empty, scalar_text, Element, RegistryEntry, RouteDoc, Slice};
use crate::loader;
use crate::report::{Category, Report};
use crate::tree::{self, SpecTree};

pub const REGISTRY_FILE: &str = "registry.yml";

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct RouteStats {
    /// Route directories found on disk.
    pub routes: usize,
    /// Slices parsed and validated.
    pub slices: usize,
    /// Registered ids without an implementation.
    pub planned: Vec<String>,
    /// Implemented directories without a registry entry.
    pub undocumented: Vec<String>,
}

/// Registered ids with no implemented directory. Uses the same matching as
/// [`registry_entry_for`], so a route is never both documented and planned.
pub fn planned_routes(entries: &[RegistryEntry], implemented: &[String]) -> Vec<String> {
    entries
        .iter()
        .filter(|e| !implemented.iter().any(|dir| e.matches_dir(dir)))
        .filter_map(|e| non_empty(&e.id))
        .map(str::to_string)
        .collect()
}

/// The registry entry describing route directory `dir`, if any.
pub fn registry_entry_for<'a>(entries: &'a [RegistryEntry], dir: &str) -> Option<&'a RegistryEntry> {
    entries.iter().find(|e| e.matches_dir(dir))
}

pub struct RouteValidator<'a> {
    tree: &'a dyn SpecTree,
    config: &'a PreflightConfig,
    breakpoints: &'a BreakpointAuthority,
    catalog: &'a AssetCatalog,
}

impl<'a> RouteValidator<'a> {
    pub fn new(
        tree: &'a dyn SpecTree,
        config: &'a PreflightConfig,
        breakpoints: &'a BreakpointAuthority,
        catalog: &'a AssetCatalog,
    ) -> Self {
        Self { tree, config, breakpoints, catalog }
    }

    /// Validate every implemented route. `registry` is `None` when the
    /// registry could not be loaded; slices are validated regardless.
    pub fn validate(&self, registry: Option<&[RegistryEntry]>, report: &mut Report) -> RouteStats {
        let routes_dir = self.config.routes_dir();
        let implemented = self.tree.list_dirs(&routes_dir);
        let mut stats = RouteStats {
            routes: implemented.len(),
            ..Default::default()
        };

        for name in &implemented {
            stats.slices += self.validate_route(&routes_dir, name, report);
        }

        if let Some(entries) = registry {
            for name in &implemented {
                if registry_entry_for(entries, name).is_none() {
                    report.info(
                        Category::Registry,
                        &format!("routes/{}", name),
                        format!("Route directory \"{}\" has no registry entry (undocumented)", name),
                    );
                    stats.undocumented.push(name.clone());
                }
            }
            stats.planned = planned_routes(entries, &implemented);
            for id in &stats.planned {
                debug!(route = %id, "registered route is planned");
            }
        }

        info!(
            routes = stats.routes,
            slices = stats.slices,
            planned = stats.planned.len(),
            "routes validated"
        );
        stats
    }

    fn validate_route(&self, routes_dir: &str, name: &str, report: &mut Report) -> usize {
        let route_dir = tree::join(routes_dir, name);

        let route_doc = tree::join(&route_dir, "route.yml");
        if self.tree.exists(&route_doc) {
            if let Err(err) = loader::load_document::<RouteDoc>(self.tree, &route_doc) {
                report.error(Category::Route, &format!("routes/{}/route.yml", name), err.to_string());
            }
        }

        let slices_dir = tree::join(&route_dir, "slices");
        if !self.tree.is_dir(&slices_dir) {
            return 0;
        }

        let mut validated = 0;
        for file_name in self.tree.list_files(&slices_dir, "yml") {
            let rel = format!("routes/{}/slices/{}", name, file_name);
            debug!(slice = %rel, "validating slice");
            match loader::load_document::<Slice>(self.tree, &tree::join(&slices_dir, &file_name)) {
                Ok(slice) => {
                    self.validate_slice(&slice, &rel, report);
                    validated += 1;
                }
                Err(err) => {
                    report.error(Category::Slice, &rel, err.to_string());
                }
            }
        }
        validated
    }

    /// Validate one parsed slice. `file` is the name used in issues.
    pub fn validate_slice(&self, slice: &Slice, file: &str, report: &mut Report) {
        let cat = Category::Slice;

        if non_empty(&slice.slice_id).is_none() {
            report.error(cat, file, "Missing sliceId");
        }
        if non_empty(&slice.route).is_none() {
            report.error(cat, file, "Missing route");
        }
        if slice.overlays.is_none() {
            report.error(cat, file, "Missing overlays");
        }
        if slice.elements.is_none() {
            report.warning(cat, file, "No elements defined");
        }

        if let Some(overlays) = &slice.overlays {
            for bp in self.breakpoints.canonical_breakpoints() {
                match overlays.get(bp) {
                    None => {
                        report.error(cat, file, format!("Missing overlay for breakpoint {}", bp));
                    }
                    Some(path) => {
                        if let Some(path) = scalar_text(path).filter(|p| !p.is_empty()) {
                            if !self.tree.exists(&path) {
                                report.error(cat, file, format!("Overlay file not found: {}", path));
                            }
                        }
                    }
                }
            }
        }

        match slice.acceptance.as_ref().and_then(|a| a.breakpoints.as_ref()) {
            Some(declared) => {
                if !self.breakpoints.matches_exactly(declared) {
                    report.error(
                        cat,
                        file,
                        format!(
                            "acceptance.breakpoints {} doesn't match meta.yml {}",
                            format_list(declared),
                            format_list(self.breakpoints.canonical_breakpoints())
                        ),
                    );
                }
            }
            None => report.warning(cat, file, "Missing acceptance.breakpoints"),
        }

        for (index, element) in slice.elements.iter().flatten().enumerate() {
            self.validate_element(element, index, file, report);
        }
    }

    fn validate_element(&self, element: &Element, index: usize, file: &str, report: &mut Report) {
        let cat = Category::Slice;
        let label = element.label(index);

        if let Some(geometry) = &element.geometry {
            for bp in self.breakpoints.missing_from(geometry.keys()) {
                report.error(cat, file, format!("{}: missing box for breakpoint {}", label, bp));
            }
        }

        if let Some(asset) = non_empty(&element.asset) {
            if !self.catalog.contains(asset) {
                report.error(
                    cat,
                    file,
                    format!("{}: references unknown asset \"{}\"", label, asset),
                );
            }
        }

        let family = element.type_style.as_ref().and_then(|t| t.family.as_deref());
        if family == Some(self.config.placeholder_family.as_str()) {
            report.info(
                cat,
                file,
                format!(
                    "{}: uses placeholder typeStyle.family \"{}\" (acceptable for non-text elements)",
                    label, self.config.placeholder_family
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoints::Breakpoint;
    use crate::loader::load_asset_entries;
    use crate::report::Issue;
    use crate::tree::MemoryTree;

    const OVERLAYS: &str = r#"
overlays:
  360: UI-SPEC/routes/home/overlays/360.png
  393: UI-SPEC/routes/home/overlays/393.png
  430: UI-SPEC/routes/home/overlays/430.png
"#;

    fn base_tree() -> MemoryTree {
        MemoryTree::new()
            .with_file("UI-SPEC/assets.yml", "- { id: icon_home, type: svg, path: assets/icon_home.svg }\n")
            .with_file("assets/icon_home.svg", "<svg/>")
            .with_file("UI-SPEC/routes/home/overlays/360.png", "")
            .with_file("UI-SPEC/routes/home/overlays/393.png", "")
            .with_file("UI-SPEC/routes/home/overlays/430.png", "")
    }

    fn validate(tree: &MemoryTree, registry: Option<&[RegistryEntry]>) -> (Report, RouteStats) {
        let config = PreflightConfig::default();
        let canonical: Vec<Breakpoint> = vec![360.into(), 393.into(), 430.into()];
        let breakpoints = BreakpointAuthority::from_meta(Some(canonical.as_slice()));
        let mut scratch = Report::new();
        let catalog = AssetCatalog::build(
            load_asset_entries(tree, "UI-SPEC/assets.yml").unwrap(),
            tree,
            &mut scratch,
        );
        let mut report = Report::new();
        let stats = RouteValidator::new(tree, &config, &breakpoints, &catalog).validate(registry, &mut report);
        (report, stats)
    }

    fn slice_yaml(body: &str) -> String {
        format!(
            "sliceId: home.main\nroute: /home\n{}\nacceptance:\n  breakpoints: [360, 393, 430]\n{}",
            OVERLAYS, body
        )
    }

    fn messages(issues: &[Issue]) -> Vec<&str> {
        issues.iter().map(|i| i.message.as_str()).collect()
    }

    #[test]
    fn test_complete_slice_is_clean() {
        let tree = base_tree().with_file(
            "UI-SPEC/routes/home/slices/main.yml",
            &slice_yaml(
                "elements:\n  - id: home_icon\n    asset: icon_home\n    box: { 360: {}, 393: {}, 430: {} }\n",
            ),
        );
        let (report, stats) = validate(&tree, None);
        assert!(report.is_empty(), "{:?}", report);
        assert_eq!(stats.routes, 1);
        assert_eq!(stats.slices, 1);
    }

    #[test]
    fn test_missing_overlay_breakpoints_one_error_each() {
        let tree = base_tree().with_file(
            "UI-SPEC/routes/home/slices/main.yml",
            "sliceId: s\nroute: /home\noverlays:\n  393: UI-SPEC/routes/home/overlays/393.png\nelements: []\nacceptance:\n  breakpoints: [360, 393, 430]\n",
        );
        let (report, _) = validate(&tree, None);
        assert_eq!(
            messages(&report.errors),
            vec!["Missing overlay for breakpoint 360", "Missing overlay for breakpoint 430"]
        );
    }

    #[test]
    fn test_overlay_file_must_exist() {
        let mut tree = base_tree().with_file(
            "UI-SPEC/routes/home/slices/main.yml",
            &slice_yaml("elements: []\n"),
        );
        tree.remove("UI-SPEC/routes/home/overlays/430.png");
        let (report, _) = validate(&tree, None);
        assert_eq!(
            messages(&report.errors),
            vec!["Overlay file not found: UI-SPEC/routes/home/overlays/430.png"]
        );
    }

    #[test]
    fn test_acceptance_order_mismatch() {
        let tree = base_tree().with_file(
            "UI-SPEC/routes/home/slices/main.yml",
            &format!(
                "sliceId: s\nroute: /home\n{}\nelements: []\nacceptance:\n  breakpoints: [\"393\", \"360\", \"430\"]\n",
                OVERLAYS
            ),
        );
        let (report, _) = validate(&tree, None);
        assert_eq!(
            messages(&report.errors),
            vec!["acceptance.breakpoints [393,360,430] doesn't match meta.yml [360,393,430]"]
        );
    }

    #[test]
    fn test_missing_acceptance_and_elements_are_warnings() {
        let tree = base_tree().with_file(
            "UI-SPEC/routes/home/slices/main.yml",
            &format!("sliceId: s\nroute: /home\n{}", OVERLAYS),
        );
        let (report, _) = validate(&tree, None);
        assert!(report.errors.is_empty());
        assert_eq!(
            messages(&report.warnings),
            vec!["No elements defined", "Missing acceptance.breakpoints"]
        );
    }

    #[test]
    fn test_required_fields() {
        let tree = base_tree().with_file("UI-SPEC/routes/home/slices/main.yml", "elements: []\n");
        let (report, _) = validate(&tree, None);
        assert_eq!(
            messages(&report.errors),
            vec!["Missing sliceId", "Missing route", "Missing overlays"]
        );
    }

    #[test]
    fn test_element_checks() {
        let tree = base_tree().with_file(
            "UI-SPEC/routes/home/slices/main.yml",
            &slice_yaml(
                r#"elements:
  - id: hero
    box: { 360: {} }
  - asset: icon_missing
  - id: divider
    typeStyle: { family: "—" }
"#,
            ),
        );
        let (report, _) = validate(&tree, None);
        assert_eq!(
            messages(&report.errors),
            vec![
                "hero: missing box for breakpoint 393",
                "hero: missing box for breakpoint 430",
                "element[1]: references unknown asset \"icon_missing\"",
            ]
        );
        assert_eq!(
            messages(&report.info),
            vec!["divider: uses placeholder typeStyle.family \"—\" (acceptable for non-text elements)"]
        );
    }

    #[test]
    fn test_numeric_element_id_keeps_slice_checks() {
        let tree = base_tree().with_file(
            "UI-SPEC/routes/home/slices/main.yml",
            "sliceId: 12\nroute: /home\noverlays:\n  360: UI-SPEC/routes/home/overlays/360.png\nacceptance:\n  breakpoints: [360, 393, 430]\nelements:\n  - { id: 7, asset: ghost }\n",
        );
        let (report, stats) = validate(&tree, None);
        assert_eq!(stats.slices, 1);
        assert_eq!(
            messages(&report.errors),
            vec![
                "Missing overlay for breakpoint 393",
                "Missing overlay for breakpoint 430",
                "7: references unknown asset \"ghost\"",
            ]
        );
    }

    #[test]
    fn test_malformed_slice_does_not_stop_siblings() {
        let tree = base_tree()
            .with_file("UI-SPEC/routes/home/slices/a.yml", "sliceId: [broken\n")
            .with_file("UI-SPEC/routes/home/slices/b.yml", "elements: []\n");
        let (report, stats) = validate(&tree, None);
        assert_eq!(stats.slices, 1);
        assert_eq!(report.errors[0].file, "routes/home/slices/a.yml");
        assert!(report.errors[0].message.starts_with("Parse error:"));
        assert!(report
            .errors
            .iter()
            .any(|i| i.file == "routes/home/slices/b.yml" && i.message == "Missing sliceId"));
    }

    #[test]
    fn test_route_without_slices_dir_is_skipped() {
        let tree = base_tree().with_file("UI-SPEC/routes/profile/route.yml", "route: /profile\n");
        let (report, stats) = validate(&tree, None);
        assert!(report.is_empty());
        assert_eq!(stats.routes, 2);
        assert_eq!(stats.slices, 0);
    }

    #[test]
    fn test_unparseable_route_doc() {
        let tree = base_tree().with_file("UI-SPEC/routes/profile/route.yml", "route: [oops\n");
        let (report, _) = validate(&tree, None);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].category, Category::Route);
        assert_eq!(report.errors[0].file, "routes/profile/route.yml");
    }

    #[test]
    fn test_registry_cross_reference() {
        let tree = base_tree()
            .with_file("UI-SPEC/routes/login/route.yml", "route: /login\n")
            .with_file("UI-SPEC/routes/scratch/route.yml", "route: /scratch\n");
        let registry = vec![
            RegistryEntry { id: Some("home".into()), ..Default::default() },
            RegistryEntry { id: Some("auth.login".into()), ..Default::default() },
            RegistryEntry { id: Some("auth.signup".into()), ..Default::default() },
            RegistryEntry { id: Some("settings".into()), path: Some("/settings".into()), ..Default::default() },
        ];
        let (report, stats) = validate(&tree, Some(registry.as_slice()));

        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
        assert_eq!(stats.planned, vec!["auth.signup", "settings"]);
        assert_eq!(stats.undocumented, vec!["scratch"]);
        assert_eq!(report.info.len(), 1);
        assert_eq!(report.info[0].file, "routes/scratch");
    }

    #[test]
    fn test_entry_matched_by_path_is_not_planned() {
        let entries = vec![
            RegistryEntry {
                id: Some("profile_screen".into()),
                path: Some("/profile".into()),
                ..Default::default()
            },
            RegistryEntry { id: Some("auth.login".into()), ..Default::default() },
        ];
        let implemented = vec!["profile".to_string(), "login".to_string()];
        assert!(planned_routes(&entries, &implemented).is_empty());
        assert_eq!(planned_routes(&entries, &["login".to_string()]), vec!["profile_screen"]);
    }

    #[test]
    fn test_path_matched_directory_is_documented_and_not_planned() {
        let tree = base_tree().with_file("UI-SPEC/routes/profile/route.yml", "route: /profile\n");
        let registry = vec![
            RegistryEntry { id: Some("home".into()), ..Default::default() },
            RegistryEntry {
                id: Some("profile_screen".into()),
                path: Some("/profile".into()),
                ..Default::default()
            },
        ];
        let (report, stats) = validate(&tree, Some(registry.as_slice()));
        assert!(report.is_empty(), "{:?}", report);
        assert!(stats.planned.is_empty());
        assert!(stats.undocumented.is_empty());
    }

    #[test]
    fn test_planned_route_raises_nothing() {
        let registry = vec![RegistryEntry { id: Some("auth.login".into()), ..Default::default() }];
        let (report, stats) = validate(
            &MemoryTree::new().with_file("UI-SPEC/assets.yml", ""),
            Some(registry.as_slice()),
        );
        assert!(report.is_empty());
        assert_eq!(stats.planned, vec!["auth.login"]);
    }
}
