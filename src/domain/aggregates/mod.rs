//! Aggregates module
pub mod variant;
pub mod combination;
pub mod product;
pub mod cart;

pub use variant::{VariantError, VariantLevel, VariantOption, VariantSet, MAX_VARIANT_LEVELS};
pub use combination::{combination_count, generate_combinations, CombinationPart, SkuCombination};
pub use product::{ProductDraft, ProductError, ProductImage, ProductStatus};
pub use cart::{Cart, CartError, CartItem};
