// libs/slot-cell/src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use shared_models::{Collection, Document, DocumentMapped, Fields, StoreError};

/// A bookable (doctor, date, time) tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: String,
    pub doctor_id: String,
    /// Denormalized for list rendering.
    pub doctor_name: String,
    /// ISO calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Free-form time label such as `10:00` or `10:00 - 10:30`.
    pub time: String,
    pub is_booked: bool,
}

impl Slot {
    pub fn is_available(&self) -> bool {
        !self.is_booked
    }
}

impl DocumentMapped for Slot {
    const COLLECTION: Collection = Collection::Slots;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_fields(&self) -> Result<Fields, StoreError> {
        let mut fields = Fields::new();
        fields.insert("doctorId".to_string(), json!(self.doctor_id));
        fields.insert("doctorName".to_string(), json!(self.doctor_name));
        fields.insert("date".to_string(), json!(self.date));
        fields.insert("time".to_string(), json!(self.time));
        fields.insert("isBooked".to_string(), json!(self.is_booked));
        Ok(fields)
    }

    fn from_document(doc: &Document) -> Result<Self, StoreError> {
        Ok(Slot {
            id: doc.id.clone(),
            doctor_id: doc.str_field("doctorId")?,
            doctor_name: doc.opt_str_field("doctorName")?.unwrap_or_default(),
            date: doc.str_field("date")?,
            time: doc.str_field("time")?,
            is_booked: doc.bool_field("isBooked")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSlot {
    pub doctor_id: String,
    #[serde(default)]
    pub doctor_name: String,
    pub date: String,
    pub time: String,
}

impl NewSlot {
    pub fn validate(&self) -> Result<(), SlotError> {
        if self.doctor_id.trim().is_empty() {
            return Err(SlotError::ValidationError("doctor_id is required".to_string()));
        }
        validate_date(&self.date)?;
        if self.time.trim().is_empty() {
            return Err(SlotError::ValidationError("time is required".to_string()));
        }
        Ok(())
    }

    pub fn into_slot(self) -> Slot {
        Slot {
            id: String::new(),
            doctor_id: self.doctor_id,
            doctor_name: self.doctor_name,
            date: self.date,
            time: self.time,
            is_booked: false,
        }
    }
}

pub fn validate_date(date: &str) -> Result<NaiveDate, SlotError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
        SlotError::ValidationError(format!("date '{}' is not an ISO date (YYYY-MM-DD)", date))
    })
}

#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Slot not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
