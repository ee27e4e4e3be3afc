mod memory;
mod mongo;
pub mod models;

use async_trait::async_trait;
use derive_more::{Display, Error, From};
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use mongodb::bson;
use mongodb::bson::Bson;
use mongodb::bson::oid::ObjectId;

use crate::models::food_requests::{FoodRequest, NewFoodRequest};
use crate::models::foods::{Food, FoodUpdate, NewFood};
use crate::models::{DeleteOutcome, InsertOutcome};

pub const FOODS_COLLECTION: &str = "Foods";
pub const FOOD_REQUESTS_COLLECTION: &str = "Food_Request";

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Debug, Display, From, Error)]
pub enum StoreError {
    #[from]
    Mongo(mongodb::error::Error),
    #[from]
    Serialization(mongodb::bson::ser::Error),
    #[display("document is missing an `_id`")]
    MissingId,
}

/// Every operation is a single round-trip against one of the two collections.
#[async_trait]
pub trait FoodStore: Send + Sync {
    async fn ping(&self) -> Result<()>;

    async fn list_foods(&self) -> Result<Vec<Food>>;

    async fn find_food(&self, id: ObjectId) -> Result<Option<Food>>;

    /// Foods ordered by `quantity`, highest first.
    async fn top_foods_by_quantity(&self, limit: usize) -> Result<Vec<Food>>;

    /// `None` matches documents whose `donatorEmail` is missing or null.
    async fn foods_by_donator(&self, email: Option<&str>) -> Result<Vec<Food>>;

    async fn insert_food(&self, food: NewFood) -> Result<InsertOutcome>;

    /// Returns the document as it looks after the update.
    async fn update_food(&self, id: ObjectId, update: FoodUpdate) -> Result<Option<Food>>;

    async fn delete_food(&self, id: ObjectId) -> Result<DeleteOutcome>;

    async fn list_requests(&self) -> Result<Vec<FoodRequest>>;

    async fn find_request(&self, id: ObjectId) -> Result<Option<FoodRequest>>;

    async fn requests_by_email(&self, email: &str) -> Result<Vec<FoodRequest>>;

    /// Persists the request with a `Pending` status.
    async fn insert_request(&self, request: NewFoodRequest) -> Result<InsertOutcome>;

    async fn set_request_status(
        &self,
        id: ObjectId,
        status: Option<Bson>,
    ) -> Result<Option<FoodRequest>>;

    async fn delete_request(&self, id: ObjectId) -> Result<DeleteOutcome>;
}
