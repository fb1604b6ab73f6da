//! Document Rules - top-level spec documents
//!
//! Each rule checks one parsed document and appends issues. Rules never see
//! the file system.

use crate::breakpoints::BreakpointAuthority;
use crate::config::PreflightConfig;
use crate::documents::{describe, non_empty, present, GridConfig, MetaConfig, MotionConfig, TokenSet};
use crate::report::{Category, Report};

/// Shared inputs for every rule in a run.
pub struct RuleContext<'a> {
    pub config: &'a PreflightConfig,
    pub breakpoints: &'a BreakpointAuthority,
}

/// A rule over one document kind.
pub trait DocumentRule {
    type Document;

    fn category(&self) -> Category;

    /// File name used in issues, relative to the spec directory.
    fn file(&self) -> &'static str;

    fn check(&self, doc: &Self::Document, ctx: &RuleContext<'_>, report: &mut Report);
}

// --- Concrete Rules ---

pub struct MetaRule;

impl DocumentRule for MetaRule {
    type Document = MetaConfig;

    fn category(&self) -> Category { Category::Meta }
    fn file(&self) -> &'static str { "meta.yml" }

    fn check(&self, meta: &MetaConfig, ctx: &RuleContext<'_>, report: &mut Report) {
        let file = self.file();
        if non_empty(&meta.project).is_none() {
            report.error(self.category(), file, "Missing \"project\" field");
        }
        if meta.units.as_deref() != Some(ctx.config.units.as_str()) {
            report.error(self.category(), file, format!("Units must be \"{}\"", ctx.config.units));
        }
        if meta.color_space.as_deref() != Some(ctx.config.color_space.as_str()) {
            report.error(
                self.category(),
                file,
                format!("ColorSpace must be \"{}\"", ctx.config.color_space),
            );
        }
        ctx.breakpoints
            .check_expected(&ctx.config.expected_breakpoints, file, report);
    }
}

pub struct TokensRule;

impl DocumentRule for TokensRule {
    type Document = TokenSet;

    fn category(&self) -> Category { Category::Tokens }
    fn file(&self) -> &'static str { "tokens.yml" }

    fn check(&self, tokens: &TokenSet, ctx: &RuleContext<'_>, report: &mut Report) {
        let (cat, file) = (self.category(), self.file());
        let colors = tokens.colors.as_ref();
        let brand = colors.and_then(|c| c.brand.as_ref());

        if brand.is_none() {
            report.error(cat, file, "Missing colors.brand");
        }
        if !present(colors.and_then(|c| c.surface.as_ref())) {
            report.error(cat, file, "Missing colors.surface");
        }
        if !present(colors.and_then(|c| c.text.as_ref())) {
            report.error(cat, file, "Missing colors.text");
        }
        if !present(tokens.typography.as_ref()) {
            report.error(cat, file, "Missing typography section");
        }
        if !present(tokens.spacing.as_ref()) {
            report.error(cat, file, "Missing spacing scale");
        }
        if !present(tokens.radii.as_ref()) {
            report.error(cat, file, "Missing radii");
        }

        for color in &ctx.config.brand_colors {
            if !present(brand.and_then(|b| b.get(color))) {
                report.warning(cat, file, format!("Missing brand.{} color", color));
            }
        }
    }
}

pub struct GridRule;

impl DocumentRule for GridRule {
    type Document = GridConfig;

    fn category(&self) -> Category { Category::Grid }
    fn file(&self) -> &'static str { "grid.yml" }

    fn check(&self, grid: &GridConfig, ctx: &RuleContext<'_>, report: &mut Report) {
        let (cat, file) = (self.category(), self.file());
        let expected = ctx.config.grid_columns;
        let columns = grid.columns.as_ref();
        if columns.and_then(|c| c.as_f64()) != Some(expected as f64) {
            report.warning(
                cat,
                file,
                format!("Expected {} columns, got {}", expected, describe(columns)),
            );
        }

        let widths = grid.container.as_ref().and_then(|c| c.widths.as_ref());
        let declared = widths.into_iter().flat_map(|w| w.keys());
        for bp in ctx.breakpoints.missing_from(declared) {
            report.error(cat, file, format!("Missing container width for breakpoint {}", bp));
        }
    }
}

pub struct MotionRule;

impl DocumentRule for MotionRule {
    type Document = MotionConfig;

    fn category(&self) -> Category { Category::Motion }
    fn file(&self) -> &'static str { "motion.yml" }

    fn check(&self, motion: &MotionConfig, _ctx: &RuleContext<'_>, report: &mut Report) {
        let (cat, file) = (self.category(), self.file());
        let defaults = motion.defaults.as_ref();

        if defaults.is_none() {
            report.error(cat, file, "Missing defaults section");
        }
        if !present(defaults.and_then(|d| d.duration.as_ref())) {
            report.error(cat, file, "Missing defaults.duration");
        }
        if !present(defaults.and_then(|d| d.easing.as_ref())) {
            report.error(cat, file, "Missing defaults.easing");
        }
        if !present(motion.policy.as_ref()) {
            report.error(cat, file, "Missing policy section");
        }
        if !present(motion.presets.as_ref()) {
            report.warning(cat, file, "No motion presets defined");
        }
    }
}
