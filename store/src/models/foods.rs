use std::cmp::Ordering;

use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document, doc};

use crate::StoreError;

pub const ID: &str = "_id";
pub const FOOD_NAME: &str = "foodName";
pub const FOOD_IMAGE: &str = "foodImage";
pub const QUANTITY: &str = "quantity";
pub const PICKUP_LOCATION: &str = "pickupLocation";
pub const EXPIRE_DATE: &str = "expireDate";
pub const ADDITIONAL_NOTE: &str = "additionalNote";
pub const DONATOR_EMAIL: &str = "donatorEmail";

/// A stored food listing.
///
/// Listings are inserted from raw request bodies, so nothing about their shape is guaranteed,
/// not even the type of `_id` for documents written by other services. The known fields are
/// exposed through accessors and everything else is kept as-is in `fields`.
#[derive(Debug, Clone, PartialEq)]
pub struct Food {
    id: Bson,
    fields: Document,
}

impl Food {
    pub fn id(&self) -> &Bson {
        &self.id
    }

    pub fn has_id(&self, id: ObjectId) -> bool {
        self.id == Bson::ObjectId(id)
    }

    pub fn fields(&self) -> &Document {
        &self.fields
    }

    pub fn food_name(&self) -> Option<&str> {
        self.fields.get_str(FOOD_NAME).ok()
    }

    pub fn donator_email(&self) -> Option<&str> {
        self.fields.get_str(DONATOR_EMAIL).ok()
    }

    pub fn quantity(&self) -> Option<&Bson> {
        self.fields.get(QUANTITY)
    }

    pub fn into_document(self) -> Document {
        let mut document = doc! { ID: self.id };
        for (key, value) in self.fields {
            document.insert(key, value);
        }
        document
    }

    pub(crate) fn apply(&mut self, update: &FoodUpdate) {
        for (key, value) in update.to_set_document() {
            self.fields.insert(key, value);
        }
    }
}

impl TryFrom<Document> for Food {
    type Error = StoreError;

    fn try_from(mut document: Document) -> Result<Self, Self::Error> {
        let id = document.remove(ID).ok_or(StoreError::MissingId)?;

        Ok(Self {
            id,
            fields: document,
        })
    }
}

/// A listing about to be inserted. Any client supplied `_id` is dropped so identifiers always
/// come from the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewFood(Document);

impl NewFood {
    pub fn new(mut fields: Document) -> Self {
        fields.remove(ID);
        Self(fields)
    }

    pub fn with_id(self, id: ObjectId) -> Food {
        Food {
            id: Bson::ObjectId(id),
            fields: self.0,
        }
    }
}

/// The whitelisted fields a listing update may touch. `None` leaves the stored value alone,
/// `Some(Bson::Null)` writes a null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoodUpdate {
    pub food_name: Option<Bson>,
    pub food_image: Option<Bson>,
    pub quantity: Option<f64>,
    pub pickup_location: Option<Bson>,
    pub expire_date: Option<Bson>,
    pub additional_note: Option<Bson>,
}

impl FoodUpdate {
    pub fn is_empty(&self) -> bool {
        self.to_set_document().is_empty()
    }

    /// Body of the `$set` operator for this update.
    pub fn to_set_document(&self) -> Document {
        let mut set = Document::new();

        let fields = [
            (FOOD_NAME, &self.food_name),
            (FOOD_IMAGE, &self.food_image),
            (PICKUP_LOCATION, &self.pickup_location),
            (EXPIRE_DATE, &self.expire_date),
            (ADDITIONAL_NOTE, &self.additional_note),
        ];

        for (key, value) in fields {
            if let Some(value) = value {
                set.insert(key, value.clone());
            }
        }

        if let Some(quantity) = self.quantity {
            set.insert(QUANTITY, quantity_to_bson(quantity));
        }

        set
    }
}

/// Whole quantities that fit in 32 bits are stored as integers, everything else as a double.
pub fn quantity_to_bson(quantity: f64) -> Bson {
    let fits_i32 = quantity >= f64::from(i32::MIN) && quantity <= f64::from(i32::MAX);
    if quantity.is_finite() && quantity.fract() == 0.0 && fits_i32 {
        Bson::Int32(quantity as i32)
    } else {
        Bson::Double(quantity)
    }
}

/// Ordering of two `quantity` values the way the store sorts mixed types: missing and null
/// first, then numbers, then strings, then anything else.
pub fn compare_quantities(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    fn rank(value: Option<&Bson>) -> u8 {
        match value {
            None | Some(Bson::Null) => 0,
            Some(Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_)) => 1,
            Some(Bson::String(_)) => 2,
            Some(_) => 3,
        }
    }

    fn numeric(value: Option<&Bson>) -> Option<f64> {
        match value? {
            Bson::Int32(n) => Some(f64::from(*n)),
            Bson::Int64(n) => Some(*n as f64),
            Bson::Double(n) => Some(*n),
            _ => None,
        }
    }

    match (a, b) {
        (Some(Bson::String(a)), Some(Bson::String(b))) => a.cmp(b),
        _ => match (numeric(a), numeric(b)) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => rank(a).cmp(&rank(b)),
        },
    }
}
