//! Multi-step product creation flow.
//!
//! Each step owns its own form data, so validation is an exhaustive match on
//! the step rather than a check of whichever fields happen to be filled in.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError};
use crate::domain::aggregates::{ProductDraft, VariantError, VariantSet};
use crate::domain::value_objects::{PriceSeed, PriceTiers};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 100))]
    pub name_alt: Option<String>,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, max = 20), custom = "validate_prefix")]
    pub sku_prefix: String,
}

fn validate_prefix(prefix: &str) -> Result<(), ValidationError> {
    if prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        Ok(())
    } else {
        Err(ValidationError::new("sku_prefix_chars"))
    }
}

#[derive(Clone, Debug)]
pub enum WizardStep {
    BasicInfo(BasicInfo),
    Variants(VariantSet),
    Pricing(PriceSeed),
    Review(Box<ProductDraft>),
}

impl WizardStep {
    pub fn index(&self) -> usize {
        match self {
            Self::BasicInfo(_) => 0,
            Self::Variants(_) => 1,
            Self::Pricing(_) => 2,
            Self::Review(_) => 3,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Entered {
    basic: BasicInfo,
    variants: VariantSet,
    pricing: PriceSeed,
}

#[derive(Clone, Debug)]
pub struct ProductWizard {
    current: WizardStep,
    entered: Entered,
}

impl Default for ProductWizard {
    fn default() -> Self { Self::new() }
}

impl ProductWizard {
    pub fn new() -> Self {
        Self { current: WizardStep::BasicInfo(BasicInfo::default()), entered: Entered::default() }
    }

    pub fn step(&self) -> &WizardStep { &self.current }

    /// Form data of the current step, for the UI to edit in place.
    pub fn step_mut(&mut self) -> &mut WizardStep { &mut self.current }

    /// Validates the current step and moves to the next one.
    pub fn advance(&mut self) -> Result<(), WizardError> {
        let next = match &self.current {
            WizardStep::BasicInfo(info) => {
                info.validate()?;
                self.entered.basic = info.clone();
                WizardStep::Variants(self.entered.variants.clone())
            }
            WizardStep::Variants(variants) => {
                variants.check()?;
                self.entered.variants = variants.clone();
                WizardStep::Pricing(self.entered.pricing.clone())
            }
            WizardStep::Pricing(seed) => {
                if !PriceTiers::from_seed(seed).is_sellable() { return Err(WizardError::MissingPrice); }
                self.entered.pricing = seed.clone();
                WizardStep::Review(Box::new(self.build_draft()))
            }
            WizardStep::Review(_) => return Err(WizardError::NoNextStep),
        };
        tracing::debug!(from = self.current.index(), to = next.index(), "wizard advanced");
        self.current = next;
        Ok(())
    }

    /// Moves one step back, keeping what was typed into the step being left.
    pub fn back(&mut self) -> Result<(), WizardError> {
        let previous = match &self.current {
            WizardStep::BasicInfo(_) => return Err(WizardError::NoPreviousStep),
            WizardStep::Variants(variants) => {
                self.entered.variants = variants.clone();
                WizardStep::BasicInfo(self.entered.basic.clone())
            }
            WizardStep::Pricing(seed) => {
                self.entered.pricing = seed.clone();
                WizardStep::Variants(self.entered.variants.clone())
            }
            WizardStep::Review(_) => WizardStep::Pricing(self.entered.pricing.clone()),
        };
        self.current = previous;
        Ok(())
    }

    /// Returns the assembled draft once the review step is reached.
    pub fn finish(self) -> Result<ProductDraft, WizardError> {
        match self.current {
            WizardStep::Review(draft) => Ok(*draft),
            _ => Err(WizardError::NotAtReview),
        }
    }

    fn build_draft(&self) -> ProductDraft {
        let basic = &self.entered.basic;
        let mut draft = ProductDraft::create(&basic.name, &basic.sku_prefix);
        draft.rename(&basic.name, basic.name_alt.clone());
        draft.set_description(&basic.description);
        draft.set_base_price(self.entered.pricing.clone());
        draft.replace_variants(self.entered.variants.clone());
        draft
    }
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Invalid input: {0}")]
    Invalid(#[from] validator::ValidationErrors),
    #[error(transparent)]
    Variant(#[from] VariantError),
    #[error("A sale or original price is required")]
    MissingPrice,
    #[error("Already at the last step")]
    NoNextStep,
    #[error("Already at the first step")]
    NoPreviousStep,
    #[error("The wizard has not reached review")]
    NotAtReview,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::VariantLevel;
    use crate::domain::value_objects::PriceField;

    fn fill_basic(w: &mut ProductWizard, name: &str, prefix: &str) {
        let WizardStep::BasicInfo(info) = w.step_mut() else { panic!("not on basic info") };
        info.name = name.into();
        info.sku_prefix = prefix.into();
    }

    #[test]
    fn test_full_flow() {
        let mut w = ProductWizard::new();
        fill_basic(&mut w, "T-Shirt", "TSHIRT");
        w.advance().unwrap();

        let WizardStep::Variants(set) = w.step_mut() else { panic!("not on variants") };
        set.push_level(VariantLevel::with_options("Color", [("Red", "RD"), ("Blue", "BL")]).unwrap()).unwrap();
        w.advance().unwrap();

        let WizardStep::Pricing(seed) = w.step_mut() else { panic!("not on pricing") };
        seed.original_price = Some(PriceField::from("25"));
        w.advance().unwrap();
        assert_eq!(w.step().index(), 3);
        assert!(matches!(w.advance(), Err(WizardError::NoNextStep)));

        let draft = w.finish().unwrap();
        assert_eq!(draft.name(), "T-Shirt");
        let skus: Vec<_> = draft.skus().iter().map(|c| c.sku.as_str()).collect();
        assert_eq!(skus, ["TSHIRT-RD", "TSHIRT-BL"]);
    }

    #[test]
    fn test_basic_info_validation() {
        let mut w = ProductWizard::new();
        assert!(matches!(w.advance(), Err(WizardError::Invalid(_))));
        fill_basic(&mut w, "Mug", "MUG 01");
        assert!(matches!(w.advance(), Err(WizardError::Invalid(_))));
        assert_eq!(w.step().index(), 0);
        assert!(matches!(w.back(), Err(WizardError::NoPreviousStep)));
    }

    #[test]
    fn test_invalid_variants_block_advance() {
        let mut w = ProductWizard::new();
        fill_basic(&mut w, "Mug", "MUG");
        w.advance().unwrap();
        let WizardStep::Variants(set) = w.step_mut() else { panic!("not on variants") };
        set.push_level(VariantLevel::new("Color")).unwrap();
        assert!(matches!(w.advance(), Err(WizardError::Variant(VariantError::NoOptions(_)))));
    }

    #[test]
    fn test_pricing_requires_a_price() {
        let mut w = ProductWizard::new();
        fill_basic(&mut w, "Mug", "MUG");
        w.advance().unwrap();
        w.advance().unwrap();
        assert!(matches!(w.advance(), Err(WizardError::MissingPrice)));
    }

    #[test]
    fn test_back_keeps_entered_data() {
        let mut w = ProductWizard::new();
        fill_basic(&mut w, "Mug", "MUG");
        w.advance().unwrap();
        let WizardStep::Variants(set) = w.step_mut() else { panic!("not on variants") };
        set.push_level(VariantLevel::with_options("Size", [("Small", "S")]).unwrap()).unwrap();
        w.back().unwrap();
        let WizardStep::BasicInfo(info) = w.step() else { panic!("not on basic info") };
        assert_eq!(info.name, "Mug");
        w.advance().unwrap();
        let WizardStep::Variants(set) = w.step() else { panic!("not on variants") };
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_finish_before_review() {
        assert!(matches!(ProductWizard::new().finish(), Err(WizardError::NotAtReview)));
    }
}
