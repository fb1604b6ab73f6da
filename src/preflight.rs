//! Preflight Orchestrator - Single Entry Point
//!
//! Runs every subsystem exactly once, in dependency order:
//! meta -> tokens/grid/motion -> asset catalog -> routes/slices.
//! Only an unusable meta.yml stops the run; everything else becomes issues.

use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::assets::{AssetCatalog, ASSETS_FILE};
use crate::breakpoints::BreakpointAuthority;
use crate::config::PreflightConfig;
use crate::documents::{MetaConfig, RegistryEntry, RouteRegistry};
use crate::loader::{self, DocumentError};
use crate::report::{Category, Outcome, Report};
use crate::routes::{RouteStats, RouteValidator, REGISTRY_FILE};
use crate::rules::{DocumentRule, GridRule, MetaRule, MotionRule, RuleContext, TokensRule};
use crate::tree::SpecTree;

pub const META_FILE: &str = "meta.yml";

#[derive(Debug, Error)]
pub enum PreflightError {
    #[error("meta.yml validation failed, cannot continue: {0}")]
    MetaUnavailable(#[source] DocumentError),

    #[error("Invalid configuration {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: DocumentError,
    },

    #[error("Failed to write report to {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where a run is. `Fatal` is terminal and never carried by a `PreflightRun`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Init,
    MetaLoaded,
    DocumentsChecked,
    AssetsIndexed,
    RoutesValidated,
    Reported,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct RunStats {
    pub assets: usize,
    pub routes: RouteStats,
}

/// Result of one complete run.
#[derive(Debug, Clone)]
pub struct PreflightRun {
    pub report: Report,
    pub stats: RunStats,
    pub stage: Stage,
}

impl PreflightRun {
    pub fn outcome(&self) -> Outcome {
        self.report.outcome()
    }

    pub fn persist(&mut self, path: &Path) -> Result<(), PreflightError> {
        self.report
            .persist(path)
            .map_err(|source| PreflightError::ReportWrite {
                path: path.to_path_buf(),
                source,
            })?;
        self.stage = Stage::Reported;
        info!(path = %path.display(), "report written");
        Ok(())
    }
}

/// The preflight engine. Holds no state between runs.
pub struct Preflight<'a> {
    tree: &'a dyn SpecTree,
    config: PreflightConfig,
}

impl<'a> Preflight<'a> {
    pub fn new(tree: &'a dyn SpecTree, config: PreflightConfig) -> Self {
        Self { tree, config }
    }

    pub fn run(&self) -> Result<PreflightRun, PreflightError> {
        let mut report = Report::new();
        let mut stage = Stage::Init;

        let meta: MetaConfig = loader::load_document(self.tree, &self.config.spec_path(META_FILE))
            .map_err(|err| {
                warn!(error = %err, "meta.yml unavailable");
                PreflightError::MetaUnavailable(err)
            })?;
        let breakpoints = BreakpointAuthority::from_meta(meta.breakpoints.as_deref());
        let ctx = RuleContext {
            config: &self.config,
            breakpoints: &breakpoints,
        };
        MetaRule.check(&meta, &ctx, &mut report);
        advance(&mut stage, Stage::MetaLoaded);

        self.check_document(&TokensRule, &ctx, &mut report);
        self.check_document(&GridRule, &ctx, &mut report);
        self.check_document(&MotionRule, &ctx, &mut report);
        advance(&mut stage, Stage::DocumentsChecked);

        let catalog = self.index_assets(&mut report);
        advance(&mut stage, Stage::AssetsIndexed);

        let registry = self.load_registry(&mut report);
        let routes = RouteValidator::new(self.tree, &self.config, &breakpoints, &catalog)
            .validate(registry.as_deref(), &mut report);
        advance(&mut stage, Stage::RoutesValidated);

        let summary = report.summarize();
        info!(
            errors = summary.errors,
            warnings = summary.warnings,
            info = summary.info,
            "preflight complete"
        );

        Ok(PreflightRun {
            report,
            stats: RunStats {
                assets: catalog.len(),
                routes,
            },
            stage,
        })
    }

    fn check_document<R>(&self, rule: &R, ctx: &RuleContext<'_>, report: &mut Report)
    where
        R: DocumentRule,
        R::Document: DeserializeOwned,
    {
        let path = self.config.spec_path(rule.file());
        match loader::load_document::<R::Document>(self.tree, &path) {
            Ok(doc) => {
                rule.check(&doc, ctx, report);
                debug!(file = rule.file(), "document checked");
            }
            Err(err) => {
                warn!(file = rule.file(), error = %err, "document unavailable");
                report.error(rule.category(), rule.file(), err.to_string());
            }
        }
    }

    fn index_assets(&self, report: &mut Report) -> AssetCatalog {
        match loader::load_asset_entries(self.tree, &self.config.spec_path(ASSETS_FILE)) {
            Ok(entries) => {
                let catalog = AssetCatalog::build(entries, self.tree, report);
                info!(assets = catalog.len(), "assets validated");
                catalog
            }
            Err(err) => {
                warn!(error = %err, "asset catalog unavailable");
                report.error(Category::Assets, ASSETS_FILE, err.to_string());
                AssetCatalog::default()
            }
        }
    }

    fn load_registry(&self, report: &mut Report) -> Option<Vec<RegistryEntry>> {
        match loader::load_document::<RouteRegistry>(self.tree, &self.config.spec_path(REGISTRY_FILE)) {
            Ok(RouteRegistry { routes: Some(routes) }) => Some(routes),
            Ok(RouteRegistry { routes: None }) => {
                report.error(Category::Registry, REGISTRY_FILE, "No routes defined");
                None
            }
            Err(err) => {
                warn!(error = %err, "registry unavailable");
                report.error(Category::Registry, REGISTRY_FILE, err.to_string());
                None
            }
        }
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!(from = ?*stage, to = ?next, "preflight stage");
    *stage = next;
}
