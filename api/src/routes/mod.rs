use axum::Router;
use axum::extract::FromRequest;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use plate_share_store::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::error::AppError;
use crate::middlewares::require_token;

pub mod food_requests;
pub mod foods;


pub fn app(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(hello))
        .merge(foods::public_routes());

    let protected_routes = foods::protected_routes()
        .merge(food_requests::food_request_routes())
        .route_layer(from_fn_with_state(state.clone(), require_token));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn hello() -> &'static str {
    "Hello World"
}

fn parse_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::InvalidId(id.to_string()))
}

/// `Json` whose rejections render as [`AppError`] bodies.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
struct JsonBody<T>(T);

#[derive(Debug, Deserialize)]
struct EmailQuery {
    email: Option<String>,
}

/// `{ success, food }`, used for single document lookups in both collections.
#[derive(Serialize)]
pub struct Found<T> {
    success: bool,
    food: T,
}

impl<T> From<T> for Found<T> {
    fn from(food: T) -> Self {
        Self {
            success: true,
            food,
        }
    }
}

/// `{ success, result }` wrapping a raw write outcome.
#[derive(Serialize)]
pub struct Outcome<T> {
    success: bool,
    result: T,
}

impl<T> From<T> for Outcome<T> {
    fn from(result: T) -> Self {
        Self {
            success: true,
            result,
        }
    }
}
