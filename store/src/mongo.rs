use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::{ClientOptions, ReturnDocument, ServerApi, ServerApiVersion};
use mongodb::{Client, Collection};

use crate::models::food_requests::{EMAIL, FOOD_STATUS, FoodRequest, NewFoodRequest};
use crate::models::foods::{DONATOR_EMAIL, Food, FoodUpdate, ID, NewFood, QUANTITY};
use crate::models::{DeleteOutcome, InsertOutcome};
use crate::{FOOD_REQUESTS_COLLECTION, FOODS_COLLECTION, FoodStore, Result};

/// Store backed by a single long-lived MongoDB client.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    foods: Collection<Document>,
    requests: Collection<FoodRequest>,
}

impl MongoStore {
    #[tracing::instrument(skip(uri))]
    pub async fn connect(uri: &str, database: &str) -> Result<MongoStore> {
        let mut options = ClientOptions::parse(uri).await?;
        let server_api = ServerApi::builder()
            .version(ServerApiVersion::V1)
            .strict(true)
            .deprecation_errors(true)
            .build();
        options.server_api = Some(server_api);

        let client = Client::with_options(options)?;
        let database = client.database(database);

        Ok(MongoStore {
            foods: database.collection(FOODS_COLLECTION),
            requests: database.collection(FOOD_REQUESTS_COLLECTION),
            client,
        })
    }

    async fn find_foods(&self, filter: Document) -> Result<Vec<Food>> {
        let documents: Vec<Document> = self.foods.find(filter).await?.try_collect().await?;
        documents.into_iter().map(Food::try_from).collect()
    }
}

#[async_trait]
impl FoodStore for MongoStore {
    async fn ping(&self) -> Result<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }

    async fn list_foods(&self) -> Result<Vec<Food>> {
        self.find_foods(doc! {}).await
    }

    async fn find_food(&self, id: ObjectId) -> Result<Option<Food>> {
        let document = self.foods.find_one(doc! { ID: id }).await?;
        document.map(Food::try_from).transpose()
    }

    async fn top_foods_by_quantity(&self, limit: usize) -> Result<Vec<Food>> {
        let documents: Vec<Document> = self
            .foods
            .find(doc! {})
            .sort(doc! { QUANTITY: -1 })
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .await?
            .try_collect()
            .await?;

        documents.into_iter().map(Food::try_from).collect()
    }

    async fn foods_by_donator(&self, email: Option<&str>) -> Result<Vec<Food>> {
        self.find_foods(doc! { DONATOR_EMAIL: email }).await
    }

    async fn insert_food(&self, food: NewFood) -> Result<InsertOutcome> {
        let id = ObjectId::new();
        self.foods
            .insert_one(food.with_id(id).into_document())
            .await?;
        Ok(InsertOutcome::acknowledged(id))
    }

    async fn update_food(&self, id: ObjectId, update: FoodUpdate) -> Result<Option<Food>> {
        let set = update.to_set_document();
        // older servers reject an empty `$set`
        if set.is_empty() {
            return self.find_food(id).await;
        }

        let document = self
            .foods
            .find_one_and_update(doc! { ID: id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?;

        document.map(Food::try_from).transpose()
    }

    async fn delete_food(&self, id: ObjectId) -> Result<DeleteOutcome> {
        let result = self.foods.delete_one(doc! { ID: id }).await?;
        Ok(DeleteOutcome::acknowledged(result.deleted_count))
    }

    async fn list_requests(&self) -> Result<Vec<FoodRequest>> {
        let requests = self.requests.find(doc! {}).await?.try_collect().await?;
        Ok(requests)
    }

    async fn find_request(&self, id: ObjectId) -> Result<Option<FoodRequest>> {
        let request = self.requests.find_one(doc! { ID: id }).await?;
        Ok(request)
    }

    async fn requests_by_email(&self, email: &str) -> Result<Vec<FoodRequest>> {
        let requests = self
            .requests
            .find(doc! { EMAIL: email })
            .await?
            .try_collect()
            .await?;
        Ok(requests)
    }

    async fn insert_request(&self, request: NewFoodRequest) -> Result<InsertOutcome> {
        let id = ObjectId::new();
        self.requests.insert_one(request.into_pending(id)).await?;
        Ok(InsertOutcome::acknowledged(id))
    }

    async fn set_request_status(
        &self,
        id: ObjectId,
        status: Option<Bson>,
    ) -> Result<Option<FoodRequest>> {
        let request = self
            .requests
            .find_one_and_update(doc! { ID: id }, doc! { "$set": { FOOD_STATUS: status } })
            .return_document(ReturnDocument::After)
            .await?;
        Ok(request)
    }

    async fn delete_request(&self, id: ObjectId) -> Result<DeleteOutcome> {
        let result = self.requests.delete_one(doc! { ID: id }).await?;
        Ok(DeleteOutcome::acknowledged(result.deleted_count))
    }
}
