//! HTTP surface: combination preview, level validation, and the saved cart.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;
use crate::config::Config;
use crate::domain::aggregates::{combination_count, generate_combinations, Cart, CartError, CartItem, SkuCombination, VariantError, VariantLevel, VariantSet};
use crate::domain::value_objects::{MemberTier, Money, PriceSeed, Sku, SkuError};
use crate::store::{CartStore, KeyValueStore, StoreError};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub carts: CartStore,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn KeyValueStore>) -> Self {
        Self { config: Arc::new(config), carts: CartStore::new(store) }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = if state.config.cors_permissive { CorsLayer::permissive() } else { CorsLayer::new() };
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "storefront-catalog"})) }))
        .route("/api/v1/variants/combinations", post(preview_combinations))
        .route("/api/v1/variants/validate", post(validate_levels))
        .route("/api/v1/cart", get(get_cart).put(add_to_cart).delete(clear_cart))
        .route("/api/v1/cart/items/:product_id/:sku", delete(remove_from_cart))
        .layer(TraceLayer::new_for_http()).layer(cors).with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub levels: Vec<VariantLevel>,
    #[serde(default)]
    pub sku_prefix: String,
    #[serde(default)]
    pub base_price: PriceSeed,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PreviewResponse { pub data: Vec<SkuCombination>, pub total: usize }

async fn preview_combinations(State(s): State<AppState>, Json(r): Json<PreviewRequest>) -> Result<Json<PreviewResponse>, ApiError> {
    let set = VariantSet::from_levels(r.levels)?;
    let limit = s.config.max_combinations;
    match combination_count(set.levels()) {
        Some(n) if n <= limit => {}
        _ => return Err(VariantError::TooManyCombinations { limit }.into()),
    }
    let prefix = match r.sku_prefix.trim() {
        "" => s.config.sku_prefix_fallback.as_str(),
        p => p,
    };
    let data = generate_combinations(set.levels(), prefix, &r.base_price);
    Ok(Json(PreviewResponse { total: data.len(), data }))
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest { pub levels: Vec<VariantLevel> }

async fn validate_levels(Json(r): Json<ValidateRequest>) -> Result<StatusCode, ApiError> {
    VariantSet::from_levels(r.levels)?.check()?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse { pub cart: Cart, pub subtotal: Money, pub tier: MemberTier }

#[derive(Debug, Deserialize)]
pub struct TierParam { #[serde(default)] pub tier: MemberTier }

fn cart_response(cart: Cart, tier: MemberTier) -> Result<Json<CartResponse>, ApiError> {
    let subtotal = cart.subtotal(tier)?;
    Ok(Json(CartResponse { subtotal, cart, tier }))
}

async fn get_cart(State(s): State<AppState>, Query(q): Query<TierParam>) -> Result<Json<CartResponse>, ApiError> {
    let cart = s.carts.load_or_new(&s.config.cart_currency)?;
    cart_response(cart, q.tier)
}

async fn add_to_cart(State(s): State<AppState>, Json(item): Json<CartItem>) -> Result<Json<CartResponse>, ApiError> {
    let mut cart = s.carts.load_or_new(&s.config.cart_currency)?;
    cart.add_item(item)?;
    s.carts.save(&cart)?;
    cart_response(cart, MemberTier::Guest)
}

async fn remove_from_cart(State(s): State<AppState>, Path((product_id, sku)): Path<(Uuid, String)>) -> Result<Json<CartResponse>, ApiError> {
    let sku = Sku::new(sku)?;
    let mut cart = s.carts.load_or_new(&s.config.cart_currency)?;
    cart.remove_item(product_id, &sku)?;
    s.carts.save(&cart)?;
    cart_response(cart, MemberTier::Guest)
}

async fn clear_cart(State(s): State<AppState>) -> Result<StatusCode, ApiError> {
    s.carts.clear()?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Variant(#[from] VariantError),
    #[error(transparent)]
    Sku(#[from] SkuError),
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse { pub error: String, pub message: String }

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Variant(_) => (StatusCode::BAD_REQUEST, "INVALID_VARIANTS"),
            ApiError::Sku(_) => (StatusCode::BAD_REQUEST, "INVALID_SKU"),
            ApiError::Cart(CartError::ItemNotFound(_)) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Cart(_) => (StatusCode::BAD_REQUEST, "INVALID_CART"),
            ApiError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
        };
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Storage is unavailable".to_string()
        } else {
            tracing::warn!(error = %self, code, "request rejected");
            self.to_string()
        };
        (status, Json(ErrorResponse { error: code.to_string(), message })).into_response()
    }
}
