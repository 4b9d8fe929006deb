use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;

/// Field map of a stored document, without its id.
pub type Fields = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Users,
    Doctors,
    Slots,
    Appointments,
    MedicalRecords,
    Reminders,
    EmergencyContacts,
    WellnessResources,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Doctors => "doctors",
            Collection::Slots => "slots",
            Collection::Appointments => "appointments",
            Collection::MedicalRecords => "medical_records",
            Collection::Reminders => "reminders",
            Collection::EmergencyContacts => "emergency_contacts",
            Collection::WellnessResources => "wellness_resources",
        }
    }

    pub fn all() -> [Collection; 8] {
        [
            Collection::Users,
            Collection::Doctors,
            Collection::Slots,
            Collection::Appointments,
            Collection::MedicalRecords,
            Collection::Reminders,
            Collection::EmergencyContacts,
            Collection::WellnessResources,
        ]
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document as returned by the store: its id plus the remaining fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self { id: id.into(), fields }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn str_field(&self, name: &str) -> Result<String, StoreError> {
        match self.fields.get(name) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(StoreError::mapping(format!(
                "field '{}' of document {} is not a string: {}",
                name, self.id, other
            ))),
            None => Err(StoreError::mapping(format!(
                "document {} is missing field '{}'",
                self.id, name
            ))),
        }
    }

    pub fn opt_str_field(&self, name: &str) -> Result<Option<String>, StoreError> {
        match self.fields.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.str_field(name).map(Some),
        }
    }

    pub fn bool_field(&self, name: &str) -> Result<bool, StoreError> {
        match self.fields.get(name) {
            Some(Value::Bool(b)) => Ok(*b),
            // Rows written before the flag existed.
            None | Some(Value::Null) => Ok(false),
            Some(other) => Err(StoreError::mapping(format!(
                "field '{}' of document {} is not a boolean: {}",
                name, self.id, other
            ))),
        }
    }

    pub fn i64_field(&self, name: &str) -> Result<i64, StoreError> {
        self.fields
            .get(name)
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                StoreError::mapping(format!(
                    "document {} has no integer field '{}'",
                    self.id, name
                ))
            })
    }
}

/// Explicit mapping between an entity and its stored document.
pub trait DocumentMapped: Sized + Send + Sync {
    const COLLECTION: Collection;

    fn id(&self) -> &str;

    fn to_fields(&self) -> Result<Fields, StoreError>;

    fn from_document(doc: &Document) -> Result<Self, StoreError>;
}

/// Serializes a serde-derived entity into document fields, dropping its `id`.
pub fn fields_from_serde<T: Serialize>(entity: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(entity) {
        Ok(Value::Object(mut map)) => {
            map.remove("id");
            Ok(map)
        }
        Ok(other) => Err(StoreError::mapping(format!(
            "entity serialized to a non-object value: {}",
            other
        ))),
        Err(e) => Err(StoreError::mapping(format!("entity could not be serialized: {}", e))),
    }
}

/// Rebuilds a serde-derived entity from a document, restoring its `id`.
pub fn entity_from_serde<T: DeserializeOwned>(doc: &Document) -> Result<T, StoreError> {
    let mut map = doc.fields.clone();
    map.insert("id".to_string(), Value::String(doc.id.clone()));
    serde_json::from_value(Value::Object(map)).map_err(|e| {
        StoreError::mapping(format!("document {} could not be decoded: {}", doc.id, e))
    })
}
