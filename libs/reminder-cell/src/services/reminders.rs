use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};
use tracing::{error, info, instrument, warn};

use shared_database::{Query, Repository, StoreGateway};
use shared_models::entities::Reminder;

use crate::models::{display_name, CancelRequest, NewReminder, ReminderError};
use crate::services::facility::AlarmFacility;
use crate::services::schedule::ReminderSchedule;

/// Medicine reminders: stored in the `reminders` collection and mirrored
/// as daily alarms on the alarm facility.
pub struct ReminderService {
    reminders: Repository<Reminder>,
    facility: Arc<dyn AlarmFacility>,
}

impl ReminderService {
    pub fn new(store: Arc<dyn StoreGateway>, facility: Arc<dyn AlarmFacility>) -> Self {
        Self {
            reminders: Repository::new(store),
            facility,
        }
    }

    pub async fn create(&self, request: NewReminder) -> Result<Reminder, ReminderError> {
        self.create_at(request, &Local::now()).await
    }

    /// Stores the reminder, then registers its alarm. If the alarm cannot be
    /// registered the stored reminder is removed again.
    #[instrument(skip(self, request, now), fields(user_id = %request.user_id))]
    pub async fn create_at<Tz: TimeZone>(
        &self,
        request: NewReminder,
        now: &DateTime<Tz>,
    ) -> Result<Reminder, ReminderError> {
        request.validate()?;
        let mut reminder = request.into_reminder();

        reminder.id = self.reminders.create(&reminder).await?;
        let schedule = ReminderSchedule::next_daily(&reminder.id, &display_name(&reminder), &reminder.time, now);

        let outcome = match schedule {
            Ok(schedule) => self.facility.schedule(&schedule).await,
            Err(e) => Err(e),
        };

        if let Err(cause) = outcome {
            error!("Alarm registration failed for reminder {}: {}", reminder.id, cause);
            if let Err(delete_err) = self.reminders.delete(&reminder.id).await {
                warn!("Reminder {} stored without an alarm: {}", reminder.id, delete_err);
            }
            return Err(cause);
        }

        info!("Reminder {} scheduled daily at {}", reminder.id, reminder.time);
        Ok(reminder)
    }

    /// Cancels the alarm, then deletes the stored reminder.
    pub async fn remove(&self, reminder_id: &str) -> Result<(), ReminderError> {
        self.facility
            .cancel(&CancelRequest {
                id: reminder_id.to_string(),
            })
            .await?;

        self.reminders.delete(reminder_id).await.map_err(|e| {
            if e.is_not_found() {
                ReminderError::NotFound(reminder_id.to_string())
            } else {
                ReminderError::Store(e)
            }
        })?;

        info!("Reminder {} removed", reminder_id);
        Ok(())
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Reminder>, ReminderError> {
        let query = Query::new().filter_eq("userId", user_id).order_by("time");
        Ok(self.reminders.list(&query).await?)
    }

    pub async fn reschedule_all(&self, user_id: &str) -> Result<usize, ReminderError> {
        self.reschedule_all_at(user_id, &Local::now()).await
    }

    /// Re-registers an alarm for every stored reminder of the user, e.g.
    /// after the device restarted and lost its alarms. Reminders with an
    /// unusable time are skipped; a facility failure stops the run.
    pub async fn reschedule_all_at<Tz: TimeZone>(
        &self,
        user_id: &str,
        now: &DateTime<Tz>,
    ) -> Result<usize, ReminderError> {
        let reminders = self.list_for_user(user_id).await?;

        let mut scheduled = 0;
        for reminder in &reminders {
            let schedule = match ReminderSchedule::next_daily(
                &reminder.id,
                &display_name(reminder),
                &reminder.time,
                now,
            ) {
                Ok(schedule) => schedule,
                Err(e) => {
                    warn!("Skipping reminder {}: {}", reminder.id, e);
                    continue;
                }
            };

            self.facility.schedule(&schedule).await?;
            scheduled += 1;
        }

        info!("Rescheduled {} of {} reminders for user {}", scheduled, reminders.len(), user_id);
        Ok(scheduled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_database::InMemoryStore;
    use shared_models::Collection;

    use crate::services::facility::MockAlarmFacility;

    fn request(time: &str) -> NewReminder {
        NewReminder {
            user_id: "u1".to_string(),
            medicine_name: "Atorvastatin".to_string(),
            time: time.to_string(),
            dosage: Some("10mg".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_schedules_with_stored_id() {
        let store = Arc::new(InMemoryStore::new());
        let mut facility = MockAlarmFacility::new();
        facility
            .expect_schedule()
            .withf(|r| r.display_name == "Atorvastatin (10mg)" && !r.id.is_empty())
            .times(1)
            .returning(|_| Ok(()));

        let service = ReminderService::new(store.clone(), Arc::new(facility));
        let reminder = service.create(request("21:00")).await.unwrap();

        assert!(store.snapshot(Collection::Reminders, &reminder.id).await.is_some());
    }

    #[tokio::test]
    async fn test_failed_alarm_removes_stored_reminder() {
        let store = Arc::new(InMemoryStore::new());
        let mut facility = MockAlarmFacility::new();
        facility
            .expect_schedule()
            .times(1)
            .returning(|_| Err(ReminderError::Facility("alarm service unavailable".to_string())));

        let service = ReminderService::new(store.clone(), Arc::new(facility));
        let result = service.create(request("21:00")).await;

        assert_matches!(result, Err(ReminderError::Facility(_)));
        assert_eq!(store.count(Collection::Reminders).await, 0);
    }

    #[tokio::test]
    async fn test_invalid_time_never_reaches_facility() {
        let store = Arc::new(InMemoryStore::new());
        let mut facility = MockAlarmFacility::new();
        facility.expect_schedule().never();

        let service = ReminderService::new(store.clone(), Arc::new(facility));
        assert_matches!(service.create(request("9pm")).await, Err(ReminderError::InvalidTime(_)));
        assert_eq!(store.count(Collection::Reminders).await, 0);
    }

    #[tokio::test]
    async fn test_remove_cancels_before_delete() {
        let store = Arc::new(InMemoryStore::new());
        let mut facility = MockAlarmFacility::new();
        facility
            .expect_cancel()
            .withf(|r| r.id == "ghost")
            .times(1)
            .returning(|_| Ok(()));

        let service = ReminderService::new(store, Arc::new(facility));
        assert_matches!(service.remove("ghost").await, Err(ReminderError::NotFound(id)) if id == "ghost");
    }
}
