//! Cart Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use crate::domain::value_objects::{MemberTier, Money, MoneyError, PriceTiers, Sku};

pub const MAX_LINE_QUANTITY: u32 = 999;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    id: Uuid,
    items: Vec<CartItem>,
    currency: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: Uuid,
    pub sku: Sku,
    pub name: String,
    pub quantity: u32,
    pub prices: PriceTiers,
}

impl CartItem {
    pub fn unit_price(&self, tier: MemberTier, currency: &str) -> Money { Money::new(self.prices.price_for(tier), currency) }
    pub fn line_total(&self, tier: MemberTier, currency: &str) -> Result<Money, MoneyError> {
        self.unit_price(tier, currency).multiply(self.quantity)
    }

    fn is_line(&self, product_id: Uuid, sku: &Sku) -> bool { self.product_id == product_id && &self.sku == sku }
}

impl Cart {
    pub fn new(currency: &str) -> Self {
        let now = Utc::now();
        Self { id: Uuid::new_v4(), items: vec![], currency: currency.to_string(), created_at: now, updated_at: now }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn item_count(&self) -> usize { self.items.len() }
    pub fn unit_count(&self) -> u32 { self.items.iter().fold(0, |n, i| n.saturating_add(i.quantity)) }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// Adds a line, merging with an existing line for the same product and SKU.
    ///
    /// The line is rejected when any tier's subtotal would fall out of range.
    pub fn add_item(&mut self, item: CartItem) -> Result<(), CartError> {
        if item.quantity == 0 { return Err(CartError::InvalidQuantity(0)); }
        let mut items = self.items.clone();
        if let Some(existing) = items.iter_mut().find(|i| i.is_line(item.product_id, &item.sku)) {
            let merged = existing.quantity.saturating_add(item.quantity);
            if merged > MAX_LINE_QUANTITY { return Err(CartError::InvalidQuantity(merged)); }
            existing.quantity = merged;
            existing.prices = item.prices;
        } else {
            if item.quantity > MAX_LINE_QUANTITY { return Err(CartError::InvalidQuantity(item.quantity)); }
            items.push(item);
        }
        for tier in MemberTier::ALL {
            sum_lines(&items, tier, &self.currency)?;
        }
        self.items = items;
        self.touch();
        Ok(())
    }

    /// Setting a quantity of zero removes the line.
    pub fn update_quantity(&mut self, product_id: Uuid, sku: &Sku, quantity: u32) -> Result<(), CartError> {
        if quantity > MAX_LINE_QUANTITY { return Err(CartError::InvalidQuantity(quantity)); }
        let index = self.items.iter().position(|i| i.is_line(product_id, sku)).ok_or_else(|| CartError::ItemNotFound(sku.to_string()))?;
        if quantity == 0 {
            self.items.remove(index);
        } else {
            let mut items = self.items.clone();
            items[index].quantity = quantity;
            for tier in MemberTier::ALL {
                sum_lines(&items, tier, &self.currency)?;
            }
            self.items = items;
        }
        self.touch();
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: Uuid, sku: &Sku) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| !i.is_line(product_id, sku));
        if self.items.len() == before { return Err(CartError::ItemNotFound(sku.to_string())); }
        self.touch();
        Ok(())
    }

    pub fn clear(&mut self) { self.items.clear(); self.touch(); }

    pub fn subtotal(&self, tier: MemberTier) -> Result<Money, CartError> {
        Ok(sum_lines(&self.items, tier, &self.currency)?)
    }

    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

fn sum_lines(items: &[CartItem], tier: MemberTier, currency: &str) -> Result<Money, MoneyError> {
    items.iter().try_fold(Money::zero(currency), |acc, i| acc.add(&i.line_total(tier, currency)?))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Item {0} not found")]
    ItemNotFound(String),
    #[error("Invalid quantity {0}")]
    InvalidQuantity(u32),
    #[error("Cart total cannot be computed: {0}")]
    Price(#[from] MoneyError),
}
