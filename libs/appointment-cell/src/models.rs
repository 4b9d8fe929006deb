// libs/appointment-cell/src/models.rs
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use shared_models::{Collection, Document, DocumentMapped, Fields, StoreError};

pub use shared_config::BookingPolicy;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub slot_id: String,
    /// ISO calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub time: String,
    pub status: AppointmentStatus,
    /// Epoch milliseconds.
    pub booked_at: i64,
}

impl Appointment {
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

impl DocumentMapped for Appointment {
    const COLLECTION: Collection = Collection::Appointments;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_fields(&self) -> Result<Fields, StoreError> {
        let mut fields = Fields::new();
        fields.insert("patientId".to_string(), json!(self.patient_id));
        fields.insert("doctorId".to_string(), json!(self.doctor_id));
        fields.insert("slotId".to_string(), json!(self.slot_id));
        fields.insert("date".to_string(), json!(self.date));
        fields.insert("time".to_string(), json!(self.time));
        fields.insert("status".to_string(), json!(self.status.as_str()));
        fields.insert("bookedAt".to_string(), json!(self.booked_at));
        Ok(fields)
    }

    fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let status = doc.str_field("status")?;
        Ok(Appointment {
            id: doc.id.clone(),
            patient_id: doc.str_field("patientId")?,
            doctor_id: doc.str_field("doctorId")?,
            slot_id: doc.str_field("slotId")?,
            date: doc.str_field("date")?,
            time: doc.str_field("time")?,
            status: status.parse().map_err(StoreError::Mapping)?,
            booked_at: doc.i64_field("bookedAt").unwrap_or_default(),
        })
    }
}

/// `Confirmed → {Cancelled, Completed}`; the other two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::Completed => "COMPLETED",
        }
    }

    pub fn valid_transitions(&self) -> &'static [AppointmentStatus] {
        match self {
            AppointmentStatus::Confirmed => &[AppointmentStatus::Cancelled, AppointmentStatus::Completed],
            // Terminal states - no transitions allowed
            AppointmentStatus::Cancelled | AppointmentStatus::Completed => &[],
        }
    }

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        self.valid_transitions().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CONFIRMED" => Ok(AppointmentStatus::Confirmed),
            "CANCELLED" | "CANCELED" => Ok(AppointmentStatus::Cancelled),
            "COMPLETED" => Ok(AppointmentStatus::Completed),
            other => Err(format!("unknown appointment status '{}'", other)),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: String,
    pub doctor_id: String,
    pub slot_id: String,
    pub date: String,
    pub time: String,
}

impl BookAppointmentRequest {
    pub fn validate(&self) -> Result<(), AppointmentError> {
        for (name, value) in [
            ("patient_id", &self.patient_id),
            ("doctor_id", &self.doctor_id),
            ("slot_id", &self.slot_id),
            ("time", &self.time),
        ] {
            if value.trim().is_empty() {
                return Err(AppointmentError::ValidationError(format!("{} is required", name)));
            }
        }

        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").map_err(|_| {
            AppointmentError::ValidationError(format!("date '{}' is not an ISO date", self.date))
        })?;

        Ok(())
    }

    pub fn into_confirmed(self, booked_at: i64) -> Appointment {
        Appointment {
            id: String::new(),
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            slot_id: self.slot_id,
            date: self.date,
            time: self.time,
            status: AppointmentStatus::Confirmed,
            booked_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelAppointmentRequest {
    pub slot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found: {0}")]
    NotFound(String),

    #[error("Appointment slot not available: {0}")]
    SlotNotAvailable(String),

    /// A two-step write stopped halfway and could not be undone.
    #[error("Inconsistent state for slot {slot_id}: {detail}")]
    InconsistentState { slot_id: String, detail: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
