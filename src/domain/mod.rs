//! Catalog domain: variant authoring, SKU generation, drafts and carts.
pub mod aggregates;
pub mod events;
pub mod value_objects;
pub mod wizard;
