//! Option maps, the variant cross-product and variant matching heuristics.
//!
//! Option names keep their original casing in storage. Comparisons made for
//! matching go through [`normalized_key`], which trims and lowercases both
//! names and values.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::Variant;
use crate::domain::staging::StagingVariant;
use crate::domain::types::VariantId;

/// Ordered mapping of option name to the values a product accepts.
pub type OptionsDefinition = IndexMap<String, Vec<String>>;

/// Ordered mapping of option name to the value a single variant carries.
pub type VariantOptions = IndexMap<String, String>;

/// Upper bound on the number of variants a single product may generate.
pub const MAX_VARIANT_COMBINATIONS: usize = 500;

/// Number of combinations [`cross_product`] would produce.
///
/// Keys with no values are ignored. Saturates instead of overflowing so that
/// absurd definitions can be rejected before anything is allocated.
pub fn combination_count(definition: &OptionsDefinition) -> usize {
    definition
        .values()
        .filter(|values| !values.is_empty())
        .fold(1usize, |acc, values| acc.saturating_mul(values.len()))
}

/// Collapse option names and values that only differ by case or padding.
///
/// The first spelling of each name and value wins. Values of names that
/// collide are merged under the first name in submission order.
pub fn distinct_options(definition: OptionsDefinition) -> OptionsDefinition {
    let mut names: IndexMap<String, (String, Vec<String>)> = IndexMap::new();
    for (name, values) in definition {
        let (_, merged) = names
            .entry(normalize_part(&name))
            .or_insert_with(|| (name, Vec::new()));
        for value in values {
            if !merged
                .iter()
                .any(|seen| normalize_part(seen) == normalize_part(&value))
            {
                merged.push(value);
            }
        }
    }
    names.into_values().collect()
}

/// Cartesian enumeration of an options definition.
///
/// The first key varies slowest. An empty definition yields exactly one empty
/// combination.
pub fn cross_product(definition: &OptionsDefinition) -> Vec<VariantOptions> {
    let mut combinations = vec![VariantOptions::new()];
    for (name, values) in definition {
        if values.is_empty() {
            continue;
        }
        let mut next = Vec::with_capacity(combinations.len() * values.len());
        for combination in &combinations {
            for value in values {
                let mut extended = combination.clone();
                extended.insert(name.clone(), value.clone());
                next.push(extended);
            }
        }
        combinations = next;
    }
    combinations
}

fn normalize_part(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Canonical comparison key for an options mapping: `color=red|size=s`.
pub fn normalized_key(options: &VariantOptions) -> String {
    let mut entries: Vec<(String, String)> = options
        .iter()
        .map(|(name, value)| (normalize_part(name), normalize_part(value)))
        .collect();
    entries.sort();
    entries
        .into_iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("|")
}

/// Normalized key built only from the options named in `definition`.
///
/// Used to pair staging variants with generated combinations when the source
/// carries options the reviewer dropped.
pub fn restricted_key(options: &VariantOptions, definition: &OptionsDefinition) -> String {
    let allowed: HashSet<String> = definition.keys().map(|k| normalize_part(k)).collect();
    let restricted: VariantOptions = options
        .iter()
        .filter(|(name, _)| allowed.contains(&normalize_part(name)))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    normalized_key(&restricted)
}

/// Lowercase kebab-case form of `value`, keeping only ASCII letters and digits.
pub fn kebab_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_dash = false;
    for ch in value.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Why a staging variant was paired with a master variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchReason {
    BarcodeMatch,
    SkuMatch,
    OptionsMatch,
    None,
}

/// Outcome of matching one staging variant against a master product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantMatch {
    pub variant_id: Option<VariantId>,
    pub reason: MatchReason,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Suggest a master variant for `staging`.
///
/// Barcode beats SKU, SKU beats options. Within one rule the first master
/// variant in `candidates` order wins.
pub fn match_variant(staging: &StagingVariant, candidates: &[Variant]) -> VariantMatch {
    if let Some(barcode) = non_blank(staging.raw_barcode.as_deref())
        && let Some(found) = candidates
            .iter()
            .find(|v| v.gtin.as_deref() == Some(barcode))
    {
        return VariantMatch {
            variant_id: Some(found.id),
            reason: MatchReason::BarcodeMatch,
        };
    }

    if let Some(sku) = non_blank(staging.raw_sku.as_deref())
        && let Some(found) = candidates.iter().find(|v| v.internal_sku.as_str() == sku)
    {
        return VariantMatch {
            variant_id: Some(found.id),
            reason: MatchReason::SkuMatch,
        };
    }

    let key = normalized_key(&staging.raw_options);
    if !key.is_empty()
        && let Some(found) = candidates
            .iter()
            .find(|v| normalized_key(&v.options) == key)
    {
        return VariantMatch {
            variant_id: Some(found.id),
            reason: MatchReason::OptionsMatch,
        };
    }

    VariantMatch {
        variant_id: None,
        reason: MatchReason::None,
    }
}
