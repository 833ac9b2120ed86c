//! Domain events
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "aggregate", content = "event")]
pub enum DomainEvent {
    Product(ProductEvent),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: Uuid, sku_prefix: String },
    CombinationsRegenerated { product_id: Uuid, count: usize, carried_over: usize },
    StockSet { product_id: Uuid, sku: String, quantity: u32 },
    Published { product_id: Uuid, sku_count: usize },
    Archived { product_id: Uuid },
}
