//! SKU combination generation.
//!
//! Every product with variant levels sells one SKU per element of the
//! cartesian product of its levels' options. The derived SKU code is the
//! prefix followed by each option code in level order, dash-joined:
//! `TSHIRT-RD-S`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use crate::domain::value_objects::{PriceSeed, PriceTiers};
use super::variant::{VariantLevel, VariantOption};

/// Prefix used when the admin leaves the SKU prefix blank.
pub const DEFAULT_SKU_PREFIX: &str = "SKU";
pub const SKU_SEPARATOR: char = '-';
/// Upper bound on the rows reserved up front; larger outputs grow as they go.
const MAX_PREALLOCATED: usize = 4096;

/// One chosen option within a combination.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationPart {
    pub level_name: String,
    pub option_value: String,
    pub option_code: String,
}

/// A single sellable variant derived from the product's levels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuCombination {
    pub id: Uuid,
    pub sku: String,
    pub combination: Vec<CombinationPart>,
    pub prices: PriceTiers,
    pub stock: u32,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Stable identity of a combination: the `(level name, option code)` path.
///
/// Unlike `sku`, the path does not change when the admin edits the prefix.
pub type CombinationKey = Vec<(String, String)>;

impl SkuCombination {
    pub fn key(&self) -> CombinationKey {
        self.combination.iter().map(|p| (p.level_name.clone(), p.option_code.clone())).collect()
    }

    pub fn label(&self) -> String {
        self.combination.iter().map(|p| p.option_value.as_str()).collect::<Vec<_>>().join(" / ")
    }
}

/// Prefix actually used for a derived SKU.
pub fn effective_prefix(sku_prefix: &str) -> &str {
    match sku_prefix.trim() {
        "" => DEFAULT_SKU_PREFIX,
        p => p,
    }
}

/// Number of combinations `levels` would produce, or `None` when it does not
/// fit in a `usize`.
pub fn combination_count(levels: &[VariantLevel]) -> Option<usize> {
    if levels.is_empty() {
        return Some(0);
    }
    levels.iter().try_fold(1usize, |n, level| n.checked_mul(level.options.len()))
}

/// Enumerates every combination of `levels` in odometer order (the last level
/// varies fastest), seeding each with `base_price` and zero stock.
///
/// No levels, or any level without options, yields an empty list. Codes are
/// not deduplicated here; uniqueness is enforced when levels are saved.
/// Callers bound the input size, see [`combination_count`].
pub fn generate_combinations(levels: &[VariantLevel], sku_prefix: &str, base_price: &PriceSeed) -> Vec<SkuCombination> {
    if levels.is_empty() {
        return vec![];
    }
    let count = combination_count(levels);
    if count == Some(0) {
        return vec![];
    }
    let ordered: Vec<Vec<&VariantOption>> = levels.iter().map(VariantLevel::sorted_options).collect();
    let mut out = Vec::with_capacity(count.unwrap_or(usize::MAX).min(MAX_PREALLOCATED));

    let seed = Seed { levels, ordered: &ordered, prefix: effective_prefix(sku_prefix), prices: PriceTiers::from_seed(base_price) };
    let mut partial = Vec::with_capacity(levels.len());
    seed.walk(0, &mut partial, &mut out);
    tracing::debug!(levels = levels.len(), combinations = out.len(), "generated sku combinations");
    out
}

/// Copies per-SKU edits from `previous` onto `fresh` where the option path
/// matches. Returns how many combinations were matched.
///
/// Stock, images and the row id always carry over. Prices carry over only
/// when they were edited away from `previous_seed`, so a new base price still
/// reaches untouched rows.
pub fn carry_over_edits(fresh: &mut [SkuCombination], previous: &[SkuCombination], previous_seed: &PriceTiers) -> usize {
    if previous.is_empty() {
        return 0;
    }
    let by_key: HashMap<CombinationKey, &SkuCombination> = previous.iter().map(|c| (c.key(), c)).collect();
    let mut matched = 0;
    for combo in fresh.iter_mut() {
        let Some(old) = by_key.get(&combo.key()) else { continue };
        combo.id = old.id;
        combo.stock = old.stock;
        combo.images = old.images.clone();
        if &old.prices != previous_seed {
            combo.prices = old.prices.clone();
        }
        matched += 1;
    }
    matched
}

struct Seed<'a> {
    levels: &'a [VariantLevel],
    ordered: &'a [Vec<&'a VariantOption>],
    prefix: &'a str,
    prices: PriceTiers,
}

impl Seed<'_> {
    fn walk(&self, depth: usize, partial: &mut Vec<CombinationPart>, out: &mut Vec<SkuCombination>) {
        if depth == self.levels.len() {
            out.push(self.emit(partial));
            return;
        }
        let level_name = &self.levels[depth].name;
        for option in &self.ordered[depth] {
            partial.push(CombinationPart {
                level_name: level_name.clone(),
                option_value: option.name.clone(),
                option_code: option.sku_code.to_string(),
            });
            self.walk(depth + 1, partial, out);
            partial.pop();
        }
    }

    fn emit(&self, parts: &[CombinationPart]) -> SkuCombination {
        let mut sku = String::from(self.prefix);
        for part in parts {
            sku.push(SKU_SEPARATOR);
            sku.push_str(&part.option_code);
        }
        SkuCombination {
            id: Uuid::new_v4(),
            sku,
            combination: parts.to_vec(),
            prices: self.prices.clone(),
            stock: 0,
            images: vec![],
        }
    }
}
