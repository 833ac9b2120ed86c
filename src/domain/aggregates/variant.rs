//! Variant levels and options as authored in the admin product form.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;
use crate::domain::value_objects::{SkuCode, SkuError};

pub const MAX_VARIANT_LEVELS: usize = 10;

/// One value on a variant axis, e.g. "Red" on "Color".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VariantOption {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    pub sku_code: SkuCode,
    #[serde(default)]
    pub sort_order: i32,
}

impl VariantOption {
    pub fn new(name: impl Into<String>, sku_code: impl Into<String>, sort_order: i32) -> Result<Self, VariantError> {
        let option = Self { name: name.into().trim().to_string(), sku_code: SkuCode::new(sku_code)?, sort_order };
        option.validate()?;
        Ok(option)
    }
}

/// One axis of variation. `level` is its 1-based position in the owning set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VariantLevel {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub options: Vec<VariantOption>,
}

impl VariantLevel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), name: name.into().trim().to_string(), level: 0, options: vec![] }
    }

    /// Builder-style helper for fixtures and seed data.
    pub fn with_options<I, N, C>(name: impl Into<String>, options: I) -> Result<Self, VariantError>
    where
        I: IntoIterator<Item = (N, C)>,
        N: Into<String>,
        C: Into<String>,
    {
        let mut level = Self::new(name);
        for (position, (option_name, code)) in options.into_iter().enumerate() {
            level.add_option(VariantOption::new(option_name, code, position as i32)?)?;
        }
        Ok(level)
    }

    pub fn add_option(&mut self, option: VariantOption) -> Result<(), VariantError> {
        if self.options.iter().any(|o| o.sku_code == option.sku_code) {
            return Err(VariantError::DuplicateCode { level: self.name.clone(), code: option.sku_code.to_string() });
        }
        self.options.push(option);
        Ok(())
    }

    pub fn remove_option(&mut self, code: &str) -> Result<VariantOption, VariantError> {
        let code = SkuCode::new(code)?;
        let index = self.options.iter().position(|o| o.sku_code == code)
            .ok_or_else(|| VariantError::OptionNotFound(code.to_string()))?;
        Ok(self.options.remove(index))
    }

    /// Options in display order: by `sort_order`, ties keep insertion order.
    pub fn sorted_options(&self) -> Vec<&VariantOption> {
        let mut options: Vec<&VariantOption> = self.options.iter().collect();
        options.sort_by_key(|o| o.sort_order);
        options
    }

    /// Save-time validation of a level and all of its options.
    pub fn check(&self) -> Result<(), VariantError> {
        Validate::validate(self)?;
        if self.options.is_empty() {
            return Err(VariantError::NoOptions(self.name.clone()));
        }
        let mut seen = HashSet::new();
        for option in &self.options {
            Validate::validate(option)?;
            if !seen.insert(&option.sku_code) {
                return Err(VariantError::DuplicateCode { level: self.name.clone(), code: option.sku_code.to_string() });
            }
        }
        Ok(())
    }
}

/// Ordered collection of variant levels for one product.
///
/// Deserializing goes through [`VariantSet::from_levels`], so a stored set
/// obeys the same limits as one built level by level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<VariantLevel>", into = "Vec<VariantLevel>")]
pub struct VariantSet {
    levels: Vec<VariantLevel>,
}

impl TryFrom<Vec<VariantLevel>> for VariantSet {
    type Error = VariantError;
    fn try_from(levels: Vec<VariantLevel>) -> Result<Self, Self::Error> { Self::from_levels(levels) }
}

impl From<VariantSet> for Vec<VariantLevel> {
    fn from(set: VariantSet) -> Self { set.levels }
}

impl VariantSet {
    pub fn new() -> Self { Self::default() }

    pub fn from_levels(levels: Vec<VariantLevel>) -> Result<Self, VariantError> {
        let mut set = Self::new();
        for level in levels { set.push_level(level)?; }
        Ok(set)
    }

    pub fn levels(&self) -> &[VariantLevel] { &self.levels }
    pub fn len(&self) -> usize { self.levels.len() }
    pub fn is_empty(&self) -> bool { self.levels.is_empty() }

    pub fn level_mut(&mut self, index: usize) -> Option<&mut VariantLevel> { self.levels.get_mut(index) }

    pub fn push_level(&mut self, level: VariantLevel) -> Result<(), VariantError> {
        if self.levels.len() >= MAX_VARIANT_LEVELS {
            return Err(VariantError::TooManyLevels { max: MAX_VARIANT_LEVELS });
        }
        if self.levels.iter().any(|l| l.name.eq_ignore_ascii_case(&level.name)) {
            return Err(VariantError::DuplicateLevel(level.name));
        }
        self.levels.push(level);
        self.renumber();
        Ok(())
    }

    pub fn remove_level(&mut self, index: usize) -> Result<VariantLevel, VariantError> {
        if index >= self.levels.len() { return Err(VariantError::LevelOutOfRange(index)); }
        let removed = self.levels.remove(index);
        self.renumber();
        Ok(removed)
    }

    pub fn move_level(&mut self, from: usize, to: usize) -> Result<(), VariantError> {
        let len = self.levels.len();
        if from >= len { return Err(VariantError::LevelOutOfRange(from)); }
        if to >= len { return Err(VariantError::LevelOutOfRange(to)); }
        let level = self.levels.remove(from);
        self.levels.insert(to, level);
        self.renumber();
        Ok(())
    }

    pub fn check(&self) -> Result<(), VariantError> {
        if self.levels.len() > MAX_VARIANT_LEVELS {
            return Err(VariantError::TooManyLevels { max: MAX_VARIANT_LEVELS });
        }
        let mut names = HashSet::new();
        for level in &self.levels {
            level.check()?;
            if !names.insert(level.name.to_ascii_lowercase()) {
                return Err(VariantError::DuplicateLevel(level.name.clone()));
            }
        }
        Ok(())
    }

    fn renumber(&mut self) {
        for (i, level) in self.levels.iter_mut().enumerate() { level.level = i as u32 + 1; }
    }
}

#[derive(Debug, Error)]
pub enum VariantError {
    #[error("Invalid variant input: {0}")]
    Invalid(#[from] validator::ValidationErrors),
    #[error(transparent)]
    Sku(#[from] SkuError),
    #[error("Option code {code} is already used in level {level}")]
    DuplicateCode { level: String, code: String },
    #[error("Variant level {0} already exists")]
    DuplicateLevel(String),
    #[error("Variant level {0} has no options")]
    NoOptions(String),
    #[error("At most {max} variant levels are allowed")]
    TooManyLevels { max: usize },
    #[error("Variant levels produce more than {limit} combinations")]
    TooManyCombinations { limit: usize },
    #[error("No variant level at position {0}")]
    LevelOutOfRange(usize),
    #[error("No option with code {0}")]
    OptionNotFound(String),
}
