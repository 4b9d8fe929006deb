use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::models::{CancelRequest, ReminderError, ScheduleRequest};

/// Platform alarm service that fires repeating reminders.
///
/// Scheduling an id that is already registered replaces the earlier alarm.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlarmFacility: Send + Sync {
    async fn schedule(&self, request: &ScheduleRequest) -> Result<(), ReminderError>;

    async fn cancel(&self, request: &CancelRequest) -> Result<(), ReminderError>;
}

/// Keeps registered alarms in process memory.
#[derive(Default)]
pub struct InMemoryAlarmFacility {
    alarms: Mutex<BTreeMap<String, ScheduleRequest>>,
}

impl InMemoryAlarmFacility {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduled(&self) -> Vec<ScheduleRequest> {
        match self.alarms.lock() {
            Ok(alarms) => alarms.values().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().values().cloned().collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<ScheduleRequest> {
        self.alarms.lock().ok().and_then(|alarms| alarms.get(id).cloned())
    }
}

#[async_trait]
impl AlarmFacility for InMemoryAlarmFacility {
    async fn schedule(&self, request: &ScheduleRequest) -> Result<(), ReminderError> {
        let mut alarms = self
            .alarms
            .lock()
            .map_err(|e| ReminderError::Facility(e.to_string()))?;
        debug!("Registering alarm {} at {}", request.id, request.fire_at_epoch_millis);
        alarms.insert(request.id.clone(), request.clone());
        Ok(())
    }

    async fn cancel(&self, request: &CancelRequest) -> Result<(), ReminderError> {
        let mut alarms = self
            .alarms
            .lock()
            .map_err(|e| ReminderError::Facility(e.to_string()))?;
        // Cancelling an unknown alarm is a no-op.
        if alarms.remove(&request.id).is_some() {
            debug!("Cancelled alarm {}", request.id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RepeatInterval;

    fn request(id: &str, fire_at: i64) -> ScheduleRequest {
        ScheduleRequest {
            id: id.to_string(),
            display_name: "Metformin".to_string(),
            fire_at_epoch_millis: fire_at,
            interval: RepeatInterval::Daily,
        }
    }

    #[tokio::test]
    async fn test_schedule_replaces_same_id() {
        let facility = InMemoryAlarmFacility::new();
        facility.schedule(&request("r1", 1_000)).await.unwrap();
        facility.schedule(&request("r1", 2_000)).await.unwrap();

        let alarms = facility.scheduled();
        assert_eq!(alarms.len(), 1);
        assert_eq!(alarms[0].fire_at_epoch_millis, 2_000);
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let facility = InMemoryAlarmFacility::new();
        facility.schedule(&request("r1", 1_000)).await.unwrap();

        let cancel = CancelRequest { id: "r1".to_string() };
        facility.cancel(&cancel).await.unwrap();
        facility.cancel(&cancel).await.unwrap();

        assert!(facility.get("r1").is_none());
    }
}
