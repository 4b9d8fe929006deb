// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, error, info, instrument, warn};

use shared_database::{Query, StoreGateway};
use shared_models::{Collection, DocumentMapped, Fields, StoreError};
use slot_cell::SlotLedger;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest, BookingPolicy,
};

/// Orchestrates booking and cancellation across the slot ledger and the
/// appointments collection.
///
/// Each operation is a sequence of independent store writes. Nothing is
/// transactional: a failure between two writes is either undone by a
/// compensating write or reported as [`AppointmentError::InconsistentState`].
pub struct AppointmentCoordinator {
    store: Arc<dyn StoreGateway>,
    ledger: SlotLedger,
    policy: BookingPolicy,
}

impl AppointmentCoordinator {
    pub fn new(store: Arc<dyn StoreGateway>) -> Self {
        Self::with_policy(store, BookingPolicy::default())
    }

    pub fn with_policy(store: Arc<dyn StoreGateway>, policy: BookingPolicy) -> Self {
        let ledger = SlotLedger::new(Arc::clone(&store));
        Self { store, ledger, policy }
    }

    pub fn policy(&self) -> BookingPolicy {
        self.policy
    }

    /// Books the slot and records a CONFIRMED appointment for it.
    ///
    /// Step 1 marks the slot booked, step 2 writes the appointment. If step 2
    /// fails and step 1 was what booked the slot, the slot is released again
    /// before the error is returned.
    #[instrument(skip(self, request), fields(slot_id = %request.slot_id, policy = %self.policy))]
    pub async fn book(&self, request: BookAppointmentRequest) -> Result<String, AppointmentError> {
        info!("Booking slot {} for patient {} with doctor {}",
              request.slot_id, request.patient_id, request.doctor_id);

        request.validate()?;
        let slot_id = request.slot_id.clone();
        let fields = request.into_confirmed(Utc::now().timestamp_millis()).to_fields()?;

        // **Step 1: Claim the slot**
        let flipped = self.claim_slot(&slot_id).await?;

        // **Step 2: Persist the appointment**
        match self.store.create(Collection::Appointments, fields).await {
            Ok(appointment_id) => {
                info!("Appointment {} confirmed for slot {}", appointment_id, slot_id);
                Ok(appointment_id)
            }
            Err(cause) if flipped => {
                error!("Appointment write failed after slot {} was booked: {}", slot_id, cause);
                Err(self.release_claimed_slot(&slot_id, cause).await)
            }
            Err(cause) => {
                // The slot was already booked before this call; leave it to its holder.
                error!("Appointment write failed for already booked slot {}: {}", slot_id, cause);
                Err(AppointmentError::Store(cause))
            }
        }
    }

    /// Marks the slot booked. Returns whether this call flipped the flag.
    async fn claim_slot(&self, slot_id: &str) -> Result<bool, AppointmentError> {
        let flipped = self.ledger.try_mark_booked(slot_id).await?;
        if flipped {
            return Ok(true);
        }

        match self.policy {
            BookingPolicy::BestEffort => {
                self.ledger.mark_booked(slot_id).await?;
                Ok(false)
            }
            BookingPolicy::ConditionalWrite => {
                Err(AppointmentError::SlotNotAvailable(slot_id.to_string()))
            }
        }
    }

    async fn release_claimed_slot(&self, slot_id: &str, cause: StoreError) -> AppointmentError {
        match self.ledger.mark_available(slot_id).await {
            Ok(()) => {
                warn!("Slot {} released after failed booking", slot_id);
                AppointmentError::Store(cause)
            }
            Err(release_err) => {
                error!("Slot {} left booked with no appointment: {}", slot_id, release_err);
                AppointmentError::InconsistentState {
                    slot_id: slot_id.to_string(),
                    detail: format!(
                        "appointment write failed ({}) and releasing the slot failed ({})",
                        cause, release_err
                    ),
                }
            }
        }
    }

    /// Cancels the appointment and reopens its slot.
    ///
    /// Both writes are attempted even if the first one fails. When only the
    /// slot release fails the appointment stays CANCELLED and the slot stays
    /// booked; that outcome is reported as `InconsistentState`.
    #[instrument(skip(self))]
    pub async fn cancel(&self, appointment_id: &str, slot_id: &str) -> Result<(), AppointmentError> {
        info!("Cancelling appointment {} (slot {})", appointment_id, slot_id);

        let status_result = self.write_status(appointment_id, AppointmentStatus::Cancelled).await;
        let release_result = self.ledger.mark_available(slot_id).await;

        match (status_result, release_result) {
            (Ok(()), Ok(())) => {
                info!("Appointment {} cancelled and slot {} reopened", appointment_id, slot_id);
                Ok(())
            }
            (Ok(()), Err(release_err)) => {
                error!("Appointment {} cancelled but slot {} is still booked: {}",
                       appointment_id, slot_id, release_err);
                Err(AppointmentError::InconsistentState {
                    slot_id: slot_id.to_string(),
                    detail: format!(
                        "appointment {} cancelled but the slot could not be released ({})",
                        appointment_id, release_err
                    ),
                })
            }
            (Err(status_err), release_result) => {
                if release_result.is_ok() {
                    warn!("Slot {} reopened but appointment {} was not cancelled",
                          slot_id, appointment_id);
                }
                Err(status_err)
            }
        }
    }

    /// Writes the status field as given. Transition legality is the caller's concern.
    pub async fn update_status(
        &self,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Setting appointment {} status to {}", appointment_id, status);
        self.write_status(appointment_id, status).await
    }

    /// Hard delete. The referenced slot is left as it is.
    pub async fn delete(&self, appointment_id: &str) -> Result<(), AppointmentError> {
        self.store
            .delete(Collection::Appointments, appointment_id)
            .await
            .map_err(|e| not_found_as(e, appointment_id))?;
        info!("Appointment {} deleted", appointment_id);
        Ok(())
    }

    pub async fn get(&self, appointment_id: &str) -> Result<Option<Appointment>, AppointmentError> {
        let doc = self.store.get(Collection::Appointments, appointment_id).await?;
        Ok(doc.map(|d| Appointment::from_document(&d)).transpose()?)
    }

    pub async fn list_for_patient(&self, patient_id: &str) -> Result<Vec<Appointment>, AppointmentError> {
        self.list(Query::new().filter_eq("patientId", patient_id)).await
    }

    pub async fn list_for_doctor(&self, doctor_id: &str) -> Result<Vec<Appointment>, AppointmentError> {
        self.list(Query::new().filter_eq("doctorId", doctor_id)).await
    }

    async fn list(&self, query: Query) -> Result<Vec<Appointment>, AppointmentError> {
        let query = query.order_by("date").order_by("time");
        let docs = self.store.query(Collection::Appointments, &query).await?;
        Ok(docs
            .iter()
            .map(Appointment::from_document)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn write_status(
        &self,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        let mut delta = Fields::new();
        delta.insert("status".to_string(), json!(status.as_str()));

        self.store
            .update(Collection::Appointments, appointment_id, delta)
            .await
            .map_err(|e| not_found_as(e, appointment_id))
    }
}

fn not_found_as(err: StoreError, appointment_id: &str) -> AppointmentError {
    if err.is_not_found() {
        AppointmentError::NotFound(appointment_id.to_string())
    } else {
        AppointmentError::Store(err)
    }
}
