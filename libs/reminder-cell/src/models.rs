// libs/reminder-cell/src/models.rs
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use shared_models::entities::Reminder;
use shared_models::StoreError;

/// Format of the reminder time of day.
pub const TIME_FORMAT: &str = "%H:%M";

pub fn parse_time_of_day(time: &str) -> Result<NaiveTime, ReminderError> {
    NaiveTime::parse_from_str(time.trim(), TIME_FORMAT)
        .map_err(|_| ReminderError::InvalidTime(time.to_string()))
}

// ==============================================================================
// ALARM REQUESTS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatInterval {
    Daily,
}

/// Everything the alarm facility needs to register a repeating alarm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub id: String,
    pub display_name: String,
    /// First firing, epoch milliseconds.
    pub fire_at_epoch_millis: i64,
    pub interval: RepeatInterval,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelRequest {
    pub id: String,
}

impl From<&ScheduleRequest> for CancelRequest {
    fn from(request: &ScheduleRequest) -> Self {
        Self {
            id: request.id.clone(),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReminder {
    pub user_id: String,
    pub medicine_name: String,
    pub time: String,
    #[serde(default)]
    pub dosage: Option<String>,
}

impl NewReminder {
    pub fn validate(&self) -> Result<(), ReminderError> {
        if self.user_id.trim().is_empty() {
            return Err(ReminderError::ValidationError("user_id is required".to_string()));
        }
        if self.medicine_name.trim().is_empty() {
            return Err(ReminderError::ValidationError("medicine_name is required".to_string()));
        }
        parse_time_of_day(&self.time)?;
        Ok(())
    }

    pub fn into_reminder(self) -> Reminder {
        Reminder {
            id: String::new(),
            user_id: self.user_id,
            medicine_name: self.medicine_name,
            time: self.time.trim().to_string(),
            dosage: self.dosage,
        }
    }
}

/// Alarm label shown to the user.
pub fn display_name(reminder: &Reminder) -> String {
    match reminder.dosage.as_deref() {
        Some(dosage) if !dosage.trim().is_empty() => {
            format!("{} ({})", reminder.medicine_name, dosage.trim())
        }
        _ => reminder.medicine_name.clone(),
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ReminderError {
    #[error("Invalid reminder time '{0}', expected HH:mm")]
    InvalidTime(String),

    /// The wall-clock time does not exist on that day, e.g. inside a DST gap.
    #[error("Reminder time {0} does not exist in the local time zone")]
    UnrepresentableTime(String),

    #[error("Reminder not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Alarm facility error: {0}")]
    Facility(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_time_of_day_parsing() {
        assert_eq!(parse_time_of_day("08:30").unwrap(), NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_matches!(parse_time_of_day("8.30am"), Err(ReminderError::InvalidTime(t)) if t == "8.30am");
        assert_matches!(parse_time_of_day("25:00"), Err(ReminderError::InvalidTime(_)));
    }

    #[test]
    fn test_display_name_includes_dosage() {
        let mut reminder = NewReminder {
            user_id: "u1".into(),
            medicine_name: "Metformin".into(),
            time: "08:00".into(),
            dosage: Some("500mg".into()),
        }
        .into_reminder();
        assert_eq!(display_name(&reminder), "Metformin (500mg)");

        reminder.dosage = Some("  ".into());
        assert_eq!(display_name(&reminder), "Metformin");
    }

    #[test]
    fn test_validation() {
        let request = NewReminder {
            user_id: "u1".into(),
            medicine_name: "".into(),
            time: "08:00".into(),
            dosage: None,
        };
        assert_matches!(request.validate(), Err(ReminderError::ValidationError(_)));
    }
}
