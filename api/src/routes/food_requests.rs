use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use plate_share_store::bson::Bson;
use plate_share_store::models::DeleteOutcome;
use plate_share_store::models::food_requests::NewFoodRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{EmailQuery, Found, JsonBody, Outcome, parse_id};
use crate::AppState;
use crate::error::AppError;
use crate::json::request_json;

pub fn food_request_routes() -> Router<AppState> {
    Router::new()
        .route("/FoodRequest", get(list_requests).post(create_request))
        .route(
            "/FoodRequest/{id}",
            get(get_request).put(update_status).delete(delete_request),
        )
        .route("/myFoodRequests", get(my_requests))
        .route("/myFoodRequests/", get(my_requests))
}

async fn list_requests(State(state): State<AppState>) -> Result<Json<Vec<Value>>, AppError> {
    let requests = state.store.list_requests().await?;
    let requests = requests
        .iter()
        .map(request_json)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(requests))
}

async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Found<Value>>, AppError> {
    let request = state
        .store
        .find_request(parse_id(&id)?)
        .await?
        .ok_or(AppError::NotFound("food request"))?;

    Ok(Json(request_json(&request)?.into()))
}

/// Either `{ success: true, requests }` or `{ success: false, message }`, always with a 200.
#[derive(Serialize)]
struct MyRequests {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    requests: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

impl MyRequests {
    fn failed(message: &'static str) -> Self {
        Self {
            success: false,
            requests: None,
            message: Some(message),
        }
    }
}

// existing clients read failures from the body, so nothing here changes the status code
async fn my_requests(
    State(state): State<AppState>,
    Query(params): Query<EmailQuery>,
) -> Json<MyRequests> {
    let Some(email) = params.email.filter(|email| !email.is_empty()) else {
        return Json(MyRequests::failed("Email is required"));
    };

    let rendered = match state.store.requests_by_email(&email).await {
        Ok(requests) => requests
            .iter()
            .map(request_json)
            .collect::<Result<Vec<_>, _>>(),
        Err(e) => Err(e),
    };

    match rendered {
        Ok(requests) => Json(MyRequests {
            success: true,
            requests: Some(requests),
            message: None,
        }),
        Err(e) => {
            tracing::error!(error = %e, %email, "failed to retrieve food requests");
            Json(MyRequests::failed("Failed to retrieve food requests"))
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestCreated {
    success: bool,
    message: &'static str,
    inserted_id: String,
}

async fn create_request(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<NewFoodRequest>,
) -> Result<Json<RequestCreated>, AppError> {
    let result = state.store.insert_request(request).await?;

    Ok(Json(RequestCreated {
        success: true,
        message: "Food request saved successfully",
        inserted_id: result.inserted_id.to_hex(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusBody {
    food_status: Option<Bson>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestUpdated {
    success: bool,
    updated_request: Value,
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<StatusBody>,
) -> Result<Json<RequestUpdated>, AppError> {
    let request = state
        .store
        .set_request_status(parse_id(&id)?, body.food_status)
        .await?
        .ok_or(AppError::NotFound("food request"))?;

    Ok(Json(RequestUpdated {
        success: true,
        updated_request: request_json(&request)?,
    }))
}

async fn delete_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Outcome<DeleteOutcome>>, AppError> {
    let result = state.store.delete_request(parse_id(&id)?).await?;
    Ok(Json(result.into()))
}
