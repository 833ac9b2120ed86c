//! Small key-value persistence for client-side state (cart, admin token).
//!
//! The store is injected so the same code runs against browser storage, an
//! in-process map, or a test double.

use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;
use crate::domain::aggregates::Cart;

pub const CART_KEY: &str = "cart";
pub const TOKEN_KEY: &str = "admin_token";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Store error: {0}")]
    Backend(String),
}

/// String key-value storage with `get`/`set`/`remove`.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Process-local store backed by a map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>, StoreError> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

fn save_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), StoreError> {
    store.set(key, &serde_json::to_string(value)?)
}

/// Shopping cart persisted under [`CART_KEY`].
#[derive(Clone)]
pub struct CartStore {
    store: Arc<dyn KeyValueStore>,
}

impl CartStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self { Self { store } }

    pub fn load(&self) -> Result<Option<Cart>, StoreError> { load_json(self.store.as_ref(), CART_KEY) }

    /// Loads the saved cart, starting a fresh one when nothing usable is stored.
    pub fn load_or_new(&self, currency: &str) -> Result<Cart, StoreError> {
        match self.load() {
            Ok(Some(cart)) => Ok(cart),
            Ok(None) => Ok(Cart::new(currency)),
            Err(StoreError::Serialization(e)) => {
                tracing::warn!(error = %e, "discarding unreadable saved cart");
                Ok(Cart::new(currency))
            }
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, cart: &Cart) -> Result<(), StoreError> { save_json(self.store.as_ref(), CART_KEY, cart) }
    pub fn clear(&self) -> Result<(), StoreError> { self.store.remove(CART_KEY) }
}

/// Admin bearer token persisted under [`TOKEN_KEY`].
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self { Self { store } }

    pub fn token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.store.get(TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    pub fn set_token(&self, token: &str) -> Result<(), StoreError> { self.store.set(TOKEN_KEY, token) }
    pub fn clear(&self) -> Result<(), StoreError> { self.store.remove(TOKEN_KEY) }
    pub fn is_signed_in(&self) -> Result<bool, StoreError> { Ok(self.token()?.is_some()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::CartItem;
    use crate::domain::value_objects::{PriceTiers, Sku};
    use uuid::Uuid;

    struct Unavailable;

    impl KeyValueStore for Unavailable {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> { Err(StoreError::Backend("quota exceeded".into())) }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> { Err(StoreError::Backend("quota exceeded".into())) }
        fn remove(&self, _key: &str) -> Result<(), StoreError> { Ok(()) }
    }

    #[test]
    fn test_cart_round_trip() {
        let carts = CartStore::new(Arc::new(MemoryStore::new()));
        let mut cart = carts.load_or_new("USD").unwrap();
        assert!(cart.is_empty());
        cart.add_item(CartItem {
            product_id: Uuid::new_v4(), sku: Sku::new("TSHIRT-RD-S").unwrap(), name: "T-Shirt".into(),
            quantity: 2, prices: PriceTiers::default(),
        }).unwrap();
        carts.save(&cart).unwrap();
        assert_eq!(carts.load().unwrap(), Some(cart));
        carts.clear().unwrap();
        assert_eq!(carts.load().unwrap(), None);
    }

    #[test]
    fn test_corrupt_cart_is_replaced() {
        let store = Arc::new(MemoryStore::new());
        store.set(CART_KEY, "{not json").unwrap();
        let carts = CartStore::new(store);
        assert!(matches!(carts.load(), Err(StoreError::Serialization(_))));
        assert!(carts.load_or_new("USD").unwrap().is_empty());
    }

    #[test]
    fn test_backend_errors_propagate() {
        let carts = CartStore::new(Arc::new(Unavailable));
        assert!(matches!(carts.load_or_new("USD"), Err(StoreError::Backend(_))));
        assert!(matches!(carts.save(&Cart::new("USD")), Err(StoreError::Backend(_))));
    }

    #[test]
    fn test_memory_store_shared_between_threads() {
        let store = Arc::new(MemoryStore::new());
        let writers: Vec<_> = (0..4)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        store.set(&format!("{t}-{i}"), "x").unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }
        assert_eq!(store.get("3-49").unwrap().as_deref(), Some("x"));
        store.remove("3-49").unwrap();
        assert_eq!(store.get("3-49").unwrap(), None);
    }

    #[test]
    fn test_token_lifecycle() {
        let tokens = TokenStore::new(Arc::new(MemoryStore::new()));
        assert!(!tokens.is_signed_in().unwrap());
        tokens.set_token("abc123").unwrap();
        assert_eq!(tokens.token().unwrap().as_deref(), Some("abc123"));
        tokens.clear().unwrap();
        assert_eq!(tokens.token().unwrap(), None);
    }
}
