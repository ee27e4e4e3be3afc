use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::models::food_requests::{FoodRequest, NewFoodRequest};
use crate::models::foods::{DONATOR_EMAIL, Food, FoodUpdate, NewFood, compare_quantities};
use crate::models::{DeleteOutcome, InsertOutcome};
use crate::{FoodStore, Result};

/// Process local store with the same query semantics as [`crate::MongoStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    foods: RwLock<Vec<Food>>,
    requests: RwLock<Vec<FoodRequest>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with raw listing documents, each of which must carry an `_id`.
    pub fn with_foods(documents: impl IntoIterator<Item = Document>) -> Result<Self> {
        let foods = documents
            .into_iter()
            .map(Food::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            foods: RwLock::new(foods),
            ..Self::default()
        })
    }
}

#[async_trait]
impl FoodStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn list_foods(&self) -> Result<Vec<Food>> {
        Ok(self.foods.read().await.clone())
    }

    async fn find_food(&self, id: ObjectId) -> Result<Option<Food>> {
        let foods = self.foods.read().await;
        Ok(foods.iter().find(|food| food.has_id(id)).cloned())
    }

    async fn top_foods_by_quantity(&self, limit: usize) -> Result<Vec<Food>> {
        let mut foods = self.foods.read().await.clone();
        foods.sort_by(|a, b| compare_quantities(b.quantity(), a.quantity()));
        foods.truncate(limit);
        Ok(foods)
    }

    async fn foods_by_donator(&self, email: Option<&str>) -> Result<Vec<Food>> {
        let foods = self.foods.read().await;
        let matches = foods
            .iter()
            .filter(|food| match email {
                Some(email) => food.donator_email() == Some(email),
                None => matches!(food.fields().get(DONATOR_EMAIL), None | Some(Bson::Null)),
            })
            .cloned()
            .collect();
        Ok(matches)
    }

    async fn insert_food(&self, food: NewFood) -> Result<InsertOutcome> {
        let id = ObjectId::new();
        self.foods.write().await.push(food.with_id(id));
        Ok(InsertOutcome::acknowledged(id))
    }

    async fn update_food(&self, id: ObjectId, update: FoodUpdate) -> Result<Option<Food>> {
        let mut foods = self.foods.write().await;
        let Some(food) = foods.iter_mut().find(|food| food.has_id(id)) else {
            return Ok(None);
        };

        food.apply(&update);
        Ok(Some(food.clone()))
    }

    async fn delete_food(&self, id: ObjectId) -> Result<DeleteOutcome> {
        let mut foods = self.foods.write().await;
        let before = foods.len();
        if let Some(index) = foods.iter().position(|food| food.has_id(id)) {
            foods.remove(index);
        }
        Ok(DeleteOutcome::acknowledged((before - foods.len()) as u64))
    }

    async fn list_requests(&self) -> Result<Vec<FoodRequest>> {
        Ok(self.requests.read().await.clone())
    }

    async fn find_request(&self, id: ObjectId) -> Result<Option<FoodRequest>> {
        let requests = self.requests.read().await;
        Ok(requests.iter().find(|request| request.has_id(id)).cloned())
    }

    async fn requests_by_email(&self, email: &str) -> Result<Vec<FoodRequest>> {
        let requests = self.requests.read().await;
        let matches = requests
            .iter()
            .filter(|request| request.has_email(email))
            .cloned()
            .collect();
        Ok(matches)
    }

    async fn insert_request(&self, request: NewFoodRequest) -> Result<InsertOutcome> {
        let id = ObjectId::new();
        self.requests.write().await.push(request.into_pending(id));
        Ok(InsertOutcome::acknowledged(id))
    }

    async fn set_request_status(
        &self,
        id: ObjectId,
        status: Option<Bson>,
    ) -> Result<Option<FoodRequest>> {
        let mut requests = self.requests.write().await;
        let Some(request) = requests.iter_mut().find(|request| request.has_id(id)) else {
            return Ok(None);
        };

        request.food_status = status;
        Ok(Some(request.clone()))
    }

    async fn delete_request(&self, id: ObjectId) -> Result<DeleteOutcome> {
        let mut requests = self.requests.write().await;
        let before = requests.len();
        requests.retain(|request| !request.has_id(id));
        Ok(DeleteOutcome::acknowledged((before - requests.len()) as u64))
    }
}
