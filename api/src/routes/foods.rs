use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use plate_share_store::bson::Bson;
use plate_share_store::models::foods::{FoodUpdate, NewFood};
use plate_share_store::models::{DeleteOutcome, InsertOutcome};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::{EmailQuery, Found, JsonBody, Outcome, parse_id};
use crate::AppState;
use crate::error::AppError;
use crate::json::{body_document, food_json};

const DYNAMIC_FOOD_LIMIT: usize = 6;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/availableFoods", get(list_foods))
        .route("/dynamicFood", get(dynamic_food))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/availableFoods", post(create_food))
        .route(
            "/availableFoods/{id}",
            get(get_food).put(update_food).delete(delete_food),
        )
        .route("/myFood", get(my_food))
}

async fn list_foods(State(state): State<AppState>) -> Result<Json<Vec<Value>>, AppError> {
    let foods = state.store.list_foods().await?;
    Ok(Json(foods.into_iter().map(food_json).collect()))
}

async fn get_food(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Found<Value>>, AppError> {
    let food = state
        .store
        .find_food(parse_id(&id)?)
        .await?
        .ok_or(AppError::NotFound("food"))?;

    Ok(Json(food_json(food).into()))
}

async fn dynamic_food(State(state): State<AppState>) -> Result<Json<Vec<Value>>, AppError> {
    let foods = state.store.top_foods_by_quantity(DYNAMIC_FOOD_LIMIT).await?;
    Ok(Json(foods.into_iter().map(food_json).collect()))
}

async fn my_food(
    State(state): State<AppState>,
    Query(params): Query<EmailQuery>,
) -> Result<Json<Vec<Value>>, AppError> {
    let foods = state
        .store
        .foods_by_donator(params.email.as_deref())
        .await?;
    Ok(Json(foods.into_iter().map(food_json).collect()))
}

async fn create_food(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<Json<Outcome<InsertOutcome>>, AppError> {
    let food = NewFood::new(body_document(&body)?);
    let result = state.store.insert_food(food).await?;
    Ok(Json(result.into()))
}

/// Whitelisted update fields. A key that is absent stays `None`, a key sent as `null` becomes
/// `Some(null)` and is written as such.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct UpdateFoodBody {
    #[serde(deserialize_with = "present")]
    food_name: Option<Bson>,
    #[serde(deserialize_with = "present")]
    food_image: Option<Bson>,
    #[serde(deserialize_with = "present")]
    quantity: Option<Value>,
    #[serde(deserialize_with = "present")]
    pickup_location: Option<Bson>,
    #[serde(deserialize_with = "present")]
    expire_date: Option<Bson>,
    #[serde(deserialize_with = "present")]
    additional_note: Option<Bson>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl UpdateFoodBody {
    fn into_update(self) -> Result<FoodUpdate, AppError> {
        Ok(FoodUpdate {
            food_name: self.food_name,
            food_image: self.food_image,
            quantity: self.quantity.map(coerce_quantity).transpose()?,
            pickup_location: self.pickup_location,
            expire_date: self.expire_date,
            additional_note: self.additional_note,
        })
    }
}

/// Accepts numbers and numeric strings. `null` and the empty string count as zero.
fn coerce_quantity(value: Value) -> Result<f64, AppError> {
    let quantity = match value {
        Value::Null => Some(0.0),
        Value::Number(number) => number.as_f64(),
        Value::String(text) if text.trim().is_empty() => Some(0.0),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    quantity
        .filter(|quantity| quantity.is_finite())
        .ok_or(AppError::InvalidQuantity)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FoodUpdated {
    success: bool,
    message: &'static str,
    updated_food: Value,
}

async fn update_food(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdateFoodBody>,
) -> Result<Json<FoodUpdated>, AppError> {
    let id = parse_id(&id)?;
    let update = body.into_update()?;

    let food = state
        .store
        .update_food(id, update)
        .await?
        .ok_or(AppError::NotFound("food"))?;

    Ok(Json(FoodUpdated {
        success: true,
        message: "Food updated successfully",
        updated_food: food_json(food),
    }))
}

async fn delete_food(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Outcome<DeleteOutcome>>, AppError> {
    let result = state.store.delete_food(parse_id(&id)?).await?;
    Ok(Json(result.into()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn quantity_accepts_numbers_and_numeric_strings() {
        assert_eq!(coerce_quantity(json!(4)).unwrap(), 4.0);
        assert_eq!(coerce_quantity(json!(" 2.5 ")).unwrap(), 2.5);
        assert_eq!(coerce_quantity(json!("")).unwrap(), 0.0);
        assert_eq!(coerce_quantity(Value::Null).unwrap(), 0.0);
        assert!(matches!(
            coerce_quantity(json!("plenty")),
            Err(AppError::InvalidQuantity)
        ));
        assert!(matches!(
            coerce_quantity(json!(true)),
            Err(AppError::InvalidQuantity)
        ));
    }

    #[test]
    fn body_without_quantity_leaves_it_out() {
        let body: UpdateFoodBody =
            serde_json::from_value(json!({ "foodName": "Soup", "donatorEmail": "x@y.z" }))
                .unwrap();
        let update = body.into_update().unwrap();

        assert_eq!(update.food_name, Some(Bson::String("Soup".to_string())));
        assert_eq!(update.quantity, None);
    }

    #[test]
    fn explicit_null_is_kept_apart_from_missing() {
        let body: UpdateFoodBody = serde_json::from_value(json!({
            "foodName": null,
            "quantity": null,
            "expireDate": 20261030,
        }))
        .unwrap();
        let update = body.into_update().unwrap();

        assert_eq!(update.food_name, Some(Bson::Null));
        assert_eq!(update.quantity, Some(0.0));
        assert_eq!(update.food_image, None);
        assert_eq!(update.additional_note, None);
        assert!(matches!(
            update.expire_date,
            Some(Bson::Int32(20261030) | Bson::Int64(20261030))
        ));
    }
}
