use mongodb::bson::Bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

pub const PENDING: &str = "Pending";

pub const EMAIL: &str = "Email";
pub const FOOD_STATUS: &str = "foodStatus";

/// A stored request. Only the field names are fixed, values keep whatever BSON type the client
/// sent, including documents written by other services sharing the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRequest {
    #[serde(rename = "_id")]
    pub id: Bson,
    #[serde(rename = "Name")]
    pub name: Option<Bson>,
    #[serde(rename = "Email")]
    pub email: Option<Bson>,
    #[serde(rename = "ImageURL")]
    pub image_url: Option<Bson>,
    /// Soft reference to a `Food`; nothing checks that it exists.
    #[serde(rename = "foodID")]
    pub food_id: Option<Bson>,
    #[serde(rename = "foodname")]
    pub food_name: Option<Bson>,
    #[serde(rename = "foodOwnerEmail")]
    pub food_owner_email: Option<Bson>,
    #[serde(rename = "ContactNumber")]
    pub contact_number: Option<Bson>,
    #[serde(rename = "foodStatus")]
    pub food_status: Option<Bson>,
}

impl FoodRequest {
    pub fn has_id(&self, id: ObjectId) -> bool {
        self.id == Bson::ObjectId(id)
    }

    pub fn has_email(&self, email: &str) -> bool {
        matches!(&self.email, Some(Bson::String(stored)) if stored == email)
    }

    pub fn status(&self) -> Option<&str> {
        self.food_status.as_ref().and_then(Bson::as_str)
    }
}

/// The client controlled part of a request. A `foodStatus` in the body is never read.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewFoodRequest {
    #[serde(rename = "Name")]
    pub name: Option<Bson>,
    #[serde(rename = "Email")]
    pub email: Option<Bson>,
    #[serde(rename = "ImageURL")]
    pub image_url: Option<Bson>,
    #[serde(rename = "foodID")]
    pub food_id: Option<Bson>,
    #[serde(rename = "foodname")]
    pub food_name: Option<Bson>,
    #[serde(rename = "foodOwnerEmail")]
    pub food_owner_email: Option<Bson>,
    #[serde(rename = "ContactNumber")]
    pub contact_number: Option<Bson>,
}

impl NewFoodRequest {
    pub fn into_pending(self, id: ObjectId) -> FoodRequest {
        FoodRequest {
            id: Bson::ObjectId(id),
            name: self.name,
            email: self.email,
            image_url: self.image_url,
            food_id: self.food_id,
            food_name: self.food_name,
            food_owner_email: self.food_owner_email,
            contact_number: self.contact_number,
            food_status: Some(Bson::String(PENDING.to_string())),
        }
    }
}
