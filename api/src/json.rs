use plate_share_store::StoreError;
use plate_share_store::bson::{self, Bson, Document};
use plate_share_store::models::food_requests::FoodRequest;
use plate_share_store::models::foods::Food;
use serde_json::Value;

/// Renders a stored document as client facing JSON. Object ids become plain hex strings,
/// everything else uses relaxed extended JSON.
pub fn document_json(document: Document) -> Value {
    Value::Object(
        document
            .into_iter()
            .map(|(key, value)| (key, bson_json(value)))
            .collect(),
    )
}

fn bson_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(id) => Value::String(id.to_hex()),
        Bson::Document(document) => document_json(document),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

pub fn food_json(food: Food) -> Value {
    document_json(food.into_document())
}

pub fn request_json(request: &FoodRequest) -> Result<Value, StoreError> {
    Ok(document_json(bson::to_document(request)?))
}

/// Converts a raw JSON body into a document ready for insertion.
pub fn body_document(body: &serde_json::Map<String, Value>) -> Result<Document, StoreError> {
    Ok(bson::to_document(body)?)
}

#[cfg(test)]
mod tests {
    use plate_share_store::bson::doc;
    use plate_share_store::bson::oid::ObjectId;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn object_ids_render_as_hex() {
        let id = ObjectId::new();
        let nested = ObjectId::new();

        let rendered = document_json(doc! {
            "_id": id,
            "quantity": 4,
            "price": 2.5,
            "tags": [nested, "fresh"],
            "owner": { "ref": nested },
        });

        assert_eq!(
            rendered,
            json!({
                "_id": id.to_hex(),
                "quantity": 4,
                "price": 2.5,
                "tags": [nested.to_hex(), "fresh"],
                "owner": { "ref": nested.to_hex() },
            })
        );
    }

    #[test]
    fn request_renders_null_fields() {
        let id = ObjectId::new();
        let request = FoodRequest {
            id: Bson::ObjectId(id),
            name: Some(Bson::String("A".to_string())),
            email: None,
            image_url: None,
            food_id: None,
            food_name: None,
            food_owner_email: None,
            contact_number: Some(Bson::Int32(123)),
            food_status: Some(Bson::String("Pending".to_string())),
        };

        let rendered = request_json(&request).unwrap();
        assert_eq!(rendered["_id"], id.to_hex());
        assert_eq!(rendered["Email"], Value::Null);
        assert_eq!(rendered["ContactNumber"], 123);
        assert_eq!(rendered["foodStatus"], "Pending");
    }

    #[test]
    fn foods_with_foreign_ids_render_as_is() {
        let food = Food::try_from(doc! { "_id": "legacy-7", "foodName": "Rice" }).unwrap();
        assert_eq!(
            food_json(food),
            json!({ "_id": "legacy-7", "foodName": "Rice" })
        );
    }
}
