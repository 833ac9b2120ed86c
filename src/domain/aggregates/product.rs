//! Product Draft Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use crate::domain::value_objects::{PriceSeed, PriceTiers};
use crate::domain::events::{DomainEvent, ProductEvent};
use super::combination::{carry_over_edits, effective_prefix, generate_combinations, SkuCombination};
use super::variant::{VariantError, VariantLevel, VariantOption, VariantSet};

pub const MAX_IMAGES: usize = 10;

/// A product being authored in the admin back-office, together with its
/// derived SKU rows.
///
/// Every change to levels, prefix or base price regenerates the rows.
/// Per-SKU stock, images and edited prices survive regeneration for every
/// option path that still exists.
#[derive(Clone, Debug)]
pub struct ProductDraft {
    id: Uuid,
    name: String,
    name_alt: Option<String>,
    description: String,
    sku_prefix: String,
    base_price: PriceSeed,
    seeded: PriceTiers,
    variants: VariantSet,
    images: Vec<ProductImage>,
    combinations: Vec<SkuCombination>,
    single: Option<SkuCombination>,
    status: ProductStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage { pub url: String, pub alt: Option<String>, pub position: u32 }
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus { #[default] Draft, Active, Archived }

impl ProductDraft {
    pub fn create(name: impl Into<String>, sku_prefix: impl Into<String>) -> Self {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let sku_prefix = sku_prefix.into().trim().to_uppercase();
        let mut product = Self {
            id, name: name.into().trim().to_string(), name_alt: None, description: String::new(),
            sku_prefix: sku_prefix.clone(), base_price: PriceSeed::default(), seeded: PriceTiers::default(),
            variants: VariantSet::new(), images: vec![], combinations: vec![], single: None,
            status: ProductStatus::Draft, created_at: now, updated_at: now, events: vec![],
        };
        product.raise_event(DomainEvent::Product(ProductEvent::Created { product_id: id, sku_prefix }));
        product.regenerate();
        product
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn name_alt(&self) -> Option<&str> { self.name_alt.as_deref() }
    pub fn description(&self) -> &str { &self.description }
    pub fn sku_prefix(&self) -> &str { effective_prefix(&self.sku_prefix) }
    pub fn base_price(&self) -> &PriceSeed { &self.base_price }
    pub fn variants(&self) -> &VariantSet { &self.variants }
    pub fn images(&self) -> &[ProductImage] { &self.images }
    pub fn status(&self) -> &ProductStatus { &self.status }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    /// The rows that will be sent to the backend: one per combination, or
    /// the single base SKU when the product has no variant levels.
    pub fn skus(&self) -> &[SkuCombination] {
        match &self.single {
            Some(single) => std::slice::from_ref(single),
            None => &self.combinations,
        }
    }

    pub fn sku(&self, sku: &str) -> Option<&SkuCombination> { self.skus().iter().find(|c| c.sku == sku) }
    pub fn total_stock(&self) -> u64 { self.skus().iter().map(|c| u64::from(c.stock)).sum() }

    pub fn rename(&mut self, name: impl Into<String>, name_alt: Option<String>) {
        self.name = name.into().trim().to_string();
        self.name_alt = name_alt.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        self.touch();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.touch();
    }

    pub fn set_sku_prefix(&mut self, prefix: impl Into<String>) {
        self.sku_prefix = prefix.into().trim().to_uppercase();
        self.regenerate();
    }

    pub fn set_base_price(&mut self, base_price: PriceSeed) {
        self.base_price = base_price;
        self.regenerate();
    }

    pub fn replace_variants(&mut self, variants: VariantSet) {
        self.variants = variants;
        self.regenerate();
    }

    pub fn add_level(&mut self, level: VariantLevel) -> Result<(), ProductError> {
        self.variants.push_level(level)?;
        self.regenerate();
        Ok(())
    }

    pub fn remove_level(&mut self, index: usize) -> Result<VariantLevel, ProductError> {
        let removed = self.variants.remove_level(index)?;
        self.regenerate();
        Ok(removed)
    }

    pub fn move_level(&mut self, from: usize, to: usize) -> Result<(), ProductError> {
        self.variants.move_level(from, to)?;
        self.regenerate();
        Ok(())
    }

    pub fn add_option(&mut self, level_index: usize, option: VariantOption) -> Result<(), ProductError> {
        let level = self.variants.level_mut(level_index).ok_or(VariantError::LevelOutOfRange(level_index))?;
        level.add_option(option)?;
        self.regenerate();
        Ok(())
    }

    pub fn remove_option(&mut self, level_index: usize, code: &str) -> Result<VariantOption, ProductError> {
        let level = self.variants.level_mut(level_index).ok_or(VariantError::LevelOutOfRange(level_index))?;
        let removed = level.remove_option(code)?;
        self.regenerate();
        Ok(removed)
    }

    pub fn set_stock(&mut self, sku: &str, quantity: u32) -> Result<(), ProductError> {
        self.sku_mut(sku)?.stock = quantity;
        self.touch();
        self.raise_event(DomainEvent::Product(ProductEvent::StockSet { product_id: self.id, sku: sku.to_string(), quantity }));
        Ok(())
    }

    pub fn set_prices(&mut self, sku: &str, prices: PriceTiers) -> Result<(), ProductError> {
        self.sku_mut(sku)?.prices = prices;
        self.touch();
        Ok(())
    }

    pub fn add_sku_image(&mut self, sku: &str, url: impl Into<String>) -> Result<(), ProductError> {
        let row = self.sku_mut(sku)?;
        if row.images.len() >= MAX_IMAGES { return Err(ProductError::TooManyImages { max: MAX_IMAGES }); }
        row.images.push(url.into());
        self.touch();
        Ok(())
    }

    pub fn add_image(&mut self, url: impl Into<String>, alt: Option<String>) -> Result<(), ProductError> {
        if self.images.len() >= MAX_IMAGES { return Err(ProductError::TooManyImages { max: MAX_IMAGES }); }
        let position = self.images.len() as u32;
        self.images.push(ProductImage { url: url.into(), alt, position });
        self.touch();
        Ok(())
    }

    pub fn publish(&mut self) -> Result<(), ProductError> {
        if self.name.is_empty() { return Err(ProductError::MissingName); }
        self.variants.check()?;
        if !self.skus().iter().any(|c| c.prices.is_sellable()) { return Err(ProductError::NotSellable); }
        self.status = ProductStatus::Active;
        self.touch();
        let sku_count = self.skus().len();
        tracing::info!(product_id = %self.id, sku_count, "product published");
        self.raise_event(DomainEvent::Product(ProductEvent::Published { product_id: self.id, sku_count }));
        Ok(())
    }

    pub fn archive(&mut self) {
        self.status = ProductStatus::Archived;
        self.touch();
        self.raise_event(DomainEvent::Product(ProductEvent::Archived { product_id: self.id }));
    }

    /// Rebuilds the SKU rows from the current levels, prefix and base price.
    pub fn regenerate(&mut self) {
        let previous_seed = std::mem::replace(&mut self.seeded, PriceTiers::from_seed(&self.base_price));
        let mut previous = std::mem::take(&mut self.combinations);
        previous.extend(self.single.take());

        let carried_over = if self.variants.is_empty() {
            let mut single = self.base_sku();
            if let Some(old) = previous.iter().find(|c| c.combination.is_empty()) {
                single.id = old.id;
                single.stock = old.stock;
                single.images = old.images.clone();
                if old.prices != previous_seed { single.prices = old.prices.clone(); }
            }
            let carried = usize::from(previous.iter().any(|c| c.combination.is_empty()));
            self.single = Some(single);
            carried
        } else {
            let mut fresh = generate_combinations(self.variants.levels(), &self.sku_prefix, &self.base_price);
            let carried = carry_over_edits(&mut fresh, &previous, &previous_seed);
            self.combinations = fresh;
            carried
        };

        self.touch();
        let count = self.skus().len();
        tracing::debug!(product_id = %self.id, count, carried_over, "sku rows regenerated");
        self.raise_event(DomainEvent::Product(ProductEvent::CombinationsRegenerated { product_id: self.id, count, carried_over }));
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }

    fn base_sku(&self) -> SkuCombination {
        SkuCombination {
            id: Uuid::new_v4(),
            sku: effective_prefix(&self.sku_prefix).to_string(),
            combination: vec![],
            prices: self.seeded.clone(),
            stock: 0,
            images: vec![],
        }
    }

    fn sku_mut(&mut self, sku: &str) -> Result<&mut SkuCombination, ProductError> {
        let rows = match &mut self.single {
            Some(single) => std::slice::from_mut(single),
            None => self.combinations.as_mut_slice(),
        };
        rows.iter_mut().find(|c| c.sku == sku).ok_or_else(|| ProductError::SkuNotFound(sku.to_string()))
    }

    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Missing name")]
    MissingName,
    #[error(transparent)]
    Variant(#[from] VariantError),
    #[error("SKU {0} not found")]
    SkuNotFound(String),
    #[error("At most {max} images are allowed")]
    TooManyImages { max: usize },
    #[error("No SKU has a price")]
    NotSellable,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::PriceField;
    use rust_decimal::Decimal;

    fn priced(sale: &str) -> PriceSeed { PriceSeed { sale_price: Some(PriceField::from(sale)), ..Default::default() } }

    fn tshirt() -> ProductDraft {
        let mut p = ProductDraft::create("T-Shirt", "tshirt");
        p.set_base_price(priced("19.99"));
        p.add_level(VariantLevel::with_options("Color", [("Red", "RD"), ("Blue", "BL")]).unwrap()).unwrap();
        p.add_level(VariantLevel::with_options("Size", [("Small", "S"), ("Large", "L")]).unwrap()).unwrap();
        p
    }

    #[test]
    fn test_product_create_has_single_sku() {
        let p = ProductDraft::create("Mug", "mug");
        assert_eq!(p.name(), "Mug");
        assert_eq!(p.skus().len(), 1);
        assert_eq!(p.skus()[0].sku, "MUG");
        assert!(p.skus()[0].combination.is_empty());
    }

    #[test]
    fn test_levels_drive_rows() {
        let p = tshirt();
        let skus: Vec<_> = p.skus().iter().map(|c| c.sku.as_str()).collect();
        assert_eq!(skus, ["TSHIRT-RD-S", "TSHIRT-RD-L", "TSHIRT-BL-S", "TSHIRT-BL-L"]);
        assert!(p.skus().iter().all(|c| c.prices.sale_price == Decimal::new(1999, 2)));
    }

    #[test]
    fn test_stock_survives_option_added() {
        let mut p = tshirt();
        p.set_stock("TSHIRT-BL-L", 12).unwrap();
        p.add_option(1, VariantOption::new("Medium", "M", 5).unwrap()).unwrap();
        assert_eq!(p.skus().len(), 6);
        assert_eq!(p.sku("TSHIRT-BL-L").unwrap().stock, 12);
        assert_eq!(p.sku("TSHIRT-BL-M").unwrap().stock, 0);
        assert_eq!(p.total_stock(), 12);
    }

    #[test]
    fn test_stock_survives_prefix_change_and_reorder() {
        let mut p = tshirt();
        p.set_stock("TSHIRT-RD-L", 3).unwrap();
        p.set_sku_prefix("tee");
        assert_eq!(p.sku("TEE-RD-L").unwrap().stock, 3);
        p.move_level(1, 0).unwrap();
        // path order changed, so the row is a new combination
        assert_eq!(p.sku("TEE-L-RD").unwrap().stock, 0);
    }

    #[test]
    fn test_base_price_reaches_unedited_rows_only() {
        let mut p = tshirt();
        let custom = PriceTiers { sale_price: Decimal::from(15), ..Default::default() };
        p.set_prices("TSHIRT-RD-S", custom.clone()).unwrap();
        p.set_base_price(priced("21"));
        assert_eq!(p.sku("TSHIRT-RD-S").unwrap().prices, custom);
        assert_eq!(p.sku("TSHIRT-RD-L").unwrap().prices.sale_price, Decimal::from(21));
    }

    #[test]
    fn test_single_sku_keeps_stock() {
        let mut p = ProductDraft::create("Mug", "mug");
        p.set_stock("MUG", 4).unwrap();
        p.set_base_price(priced("5"));
        assert_eq!(p.sku("MUG").unwrap().stock, 4);
        assert_eq!(p.sku("MUG").unwrap().prices.sale_price, Decimal::from(5));
    }

    #[test]
    fn test_unknown_sku() {
        let mut p = tshirt();
        assert!(matches!(p.set_stock("NOPE", 1), Err(ProductError::SkuNotFound(_))));
    }

    #[test]
    fn test_image_limit() {
        let mut p = tshirt();
        for i in 0..MAX_IMAGES { p.add_image(format!("img-{i}.jpg"), None).unwrap(); }
        assert!(matches!(p.add_image("extra.jpg", None), Err(ProductError::TooManyImages { max: 10 })));
        assert_eq!(p.images()[9].position, 9);
    }

    #[test]
    fn test_publish_rules() {
        let mut unnamed = ProductDraft::create(" ", "x");
        assert!(matches!(unnamed.publish(), Err(ProductError::MissingName)));

        let mut free = ProductDraft::create("Freebie", "free");
        assert!(matches!(free.publish(), Err(ProductError::NotSellable)));

        let mut p = tshirt();
        p.take_events();
        p.publish().unwrap();
        assert_eq!(p.status(), &ProductStatus::Active);
        assert_eq!(p.take_events(), vec![DomainEvent::Product(ProductEvent::Published { product_id: p.id(), sku_count: 4 })]);
    }

    #[test]
    fn test_rename_bilingual() {
        let mut p = tshirt();
        p.rename("T-Shirt", Some(" T恤 ".into()));
        assert_eq!(p.name_alt(), Some("T恤"));
        p.rename("T-Shirt", Some("".into()));
        assert_eq!(p.name_alt(), None);
    }
}
