//! Breakpoint Authority
//!
//! Breakpoints are logically pixel widths but YAML keys are text, so every
//! comparison happens on the canonical textual form (`360`, not `360.0`).

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::report::{Category, Report};

/// A breakpoint width in its canonical textual form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Breakpoint(String);

impl Breakpoint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u32> for Breakpoint {
    fn from(width: u32) -> Self {
        Self(width.to_string())
    }
}

impl From<&str> for Breakpoint {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl Serialize for Breakpoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<u64>() {
            Ok(width) => serializer.serialize_u64(width),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

struct BreakpointVisitor;

impl<'de> Visitor<'de> for BreakpointVisitor {
    type Value = Breakpoint;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a breakpoint width as a number or string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Breakpoint, E> {
        Ok(Breakpoint(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Breakpoint, E> {
        Ok(Breakpoint(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Breakpoint, E> {
        Ok(Breakpoint(v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Breakpoint, E> {
        Ok(Breakpoint(v.to_string()))
    }
}

impl<'de> Deserialize<'de> for Breakpoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(BreakpointVisitor)
    }
}

/// Render a breakpoint list the way the reports have always shown it: `[360,393,430]`.
pub fn format_list(breakpoints: &[Breakpoint]) -> String {
    let joined: Vec<&str> = breakpoints.iter().map(Breakpoint::as_str).collect();
    format!("[{}]", joined.join(","))
}

/// Canonical ordered breakpoint set for one run, derived from meta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointAuthority {
    canonical: Vec<Breakpoint>,
}

impl BreakpointAuthority {
    pub fn from_meta(declared: Option<&[Breakpoint]>) -> Self {
        Self {
            canonical: declared.map(<[Breakpoint]>::to_vec).unwrap_or_default(),
        }
    }

    pub fn canonical_breakpoints(&self) -> &[Breakpoint] {
        &self.canonical
    }

    /// Breakpoints of the canonical set absent from `present`, in canonical order.
    pub fn missing_from<'p, I>(&self, present: I) -> Vec<&Breakpoint>
    where
        I: IntoIterator<Item = &'p Breakpoint> + Clone,
    {
        self.canonical
            .iter()
            .filter(|bp| !present.clone().into_iter().any(|p| p == *bp))
            .collect()
    }

    /// Order-and-value equality against the canonical set.
    pub fn matches_exactly(&self, other: &[Breakpoint]) -> bool {
        self.canonical.as_slice() == other
    }

    /// The product supports exactly one breakpoint set; anything else is one error.
    pub fn check_expected(&self, expected: &[Breakpoint], file: &str, report: &mut Report) {
        if !self.matches_exactly(expected) {
            report.error(
                Category::Meta,
                file,
                format!(
                    "Breakpoints mismatch. Expected {}, got {}",
                    format_list(expected),
                    format_list(&self.canonical)
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn bps(widths: &[u32]) -> Vec<Breakpoint> {
        widths.iter().copied().map(Breakpoint::from).collect()
    }

    #[test]
    fn test_numeric_and_text_keys_normalize() {
        let parsed: Vec<Breakpoint> = serde_yaml::from_str("[360, \"393\", 430.0]").unwrap();
        assert_eq!(parsed, bps(&[360, 393, 430]));
    }

    #[test]
    fn test_breakpoint_map_keys() {
        let parsed: BTreeMap<Breakpoint, String> =
            serde_yaml::from_str("360: a.png\n\"393\": b.png\n").unwrap();
        assert!(parsed.contains_key(&Breakpoint::from(360)));
        assert!(parsed.contains_key(&Breakpoint::from(393)));
    }

    #[test]
    fn test_expected_set_exact_match_is_clean() {
        let authority = BreakpointAuthority::from_meta(Some(bps(&[360, 393, 430]).as_slice()));
        let mut report = Report::new();
        authority.check_expected(&bps(&[360, 393, 430]), "meta.yml", &mut report);
        assert!(report.is_empty());
    }

    #[test]
    fn test_any_deviation_is_exactly_one_error() {
        let expected = bps(&[360, 393, 430]);
        let deviations = [
            bps(&[360, 393]),
            bps(&[393, 360, 430]),
            bps(&[]),
            bps(&[360, 393, 430, 768]),
        ];
        for declared in deviations {
            let authority = BreakpointAuthority::from_meta(Some(declared.as_slice()));
            let mut report = Report::new();
            authority.check_expected(&expected, "meta.yml", &mut report);
            assert_eq!(report.errors.len(), 1, "declared {:?}", declared);
        }
    }

    #[test]
    fn test_mismatch_message_lists_both_sets() {
        let authority = BreakpointAuthority::from_meta(Some(bps(&[360, 393]).as_slice()));
        let mut report = Report::new();
        authority.check_expected(&bps(&[360, 393, 430]), "meta.yml", &mut report);
        assert_eq!(
            report.errors[0].message,
            "Breakpoints mismatch. Expected [360,393,430], got [360,393]"
        );
    }

    #[test]
    fn test_missing_from_keeps_canonical_order() {
        let authority = BreakpointAuthority::from_meta(Some(bps(&[360, 393, 430]).as_slice()));
        let present = bps(&[393]);
        let missing = authority.missing_from(present.iter());
        assert_eq!(missing, vec![&Breakpoint::from(360), &Breakpoint::from(430)]);
    }
}
