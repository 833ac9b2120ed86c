//! Storefront Catalog
//!
//! Catalog core for a bilingual storefront and its admin back-office.
//!
//! ## Features
//! - Variant levels and options with save-time validation
//! - SKU combination generation (cartesian product of option levels)
//! - Product drafts that keep per-SKU edits across regeneration
//! - Member-tier pricing
//! - Product creation wizard
//! - Shopping cart and admin token over an injected key-value store

use thiserror::Error;

pub mod api;
pub mod config;
pub mod domain;
pub mod store;

pub use domain::aggregates::{
    generate_combinations, Cart, CartItem, CombinationPart, ProductDraft, SkuCombination, VariantLevel, VariantOption, VariantSet,
};
pub use domain::value_objects::{MemberTier, PriceField, PriceSeed, PriceTiers, Sku, SkuCode};
pub use domain::wizard::{ProductWizard, WizardStep};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Variant(#[from] domain::aggregates::VariantError),

    #[error(transparent)]
    Product(#[from] domain::aggregates::ProductError),

    #[error(transparent)]
    Cart(#[from] domain::aggregates::CartError),

    #[error(transparent)]
    Wizard(#[from] domain::wizard::WizardError),

    #[error(transparent)]
    Sku(#[from] domain::value_objects::SkuError),

    #[error("Storage error: {0}")]
    Storage(#[from] store::StoreError),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
