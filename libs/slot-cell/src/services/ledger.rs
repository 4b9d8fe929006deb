// libs/slot-cell/src/services/ledger.rs
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_database::{Predicate, Query, StoreGateway};
use shared_models::{Collection, DocumentMapped, Fields, StoreError};

use crate::models::{NewSlot, Slot, SlotError};

const IS_BOOKED: &str = "isBooked";

/// Availability of bookable slots, read and written straight through the store.
///
/// Nothing here prevents two callers from booking the same slot with
/// [`SlotLedger::mark_booked`]; use [`SlotLedger::try_mark_booked`] for a
/// compare-and-set on the booked flag.
pub struct SlotLedger {
    store: Arc<dyn StoreGateway>,
}

impl SlotLedger {
    pub fn new(store: Arc<dyn StoreGateway>) -> Self {
        Self { store }
    }

    /// Open slots of one doctor, ordered by date then time.
    pub async fn list_available(&self, doctor_id: &str) -> Result<Vec<Slot>, StoreError> {
        debug!("Fetching available slots for doctor: {}", doctor_id);

        let query = Query::new()
            .filter_eq("doctorId", doctor_id)
            .filter_eq(IS_BOOKED, false)
            .order_by("date")
            .order_by("time");

        self.fetch(&query).await
    }

    /// Open slots on one calendar date across all doctors.
    pub async fn list_by_date(&self, date: &str) -> Result<Vec<Slot>, StoreError> {
        debug!("Fetching available slots on {}", date);

        let query = Query::new()
            .filter_eq("date", date)
            .filter_eq(IS_BOOKED, false)
            .order_by("time");

        self.fetch(&query).await
    }

    async fn fetch(&self, query: &Query) -> Result<Vec<Slot>, StoreError> {
        let docs = self.store.query(Collection::Slots, query).await?;
        let mut slots = docs
            .iter()
            .map(Slot::from_document)
            .collect::<Result<Vec<_>, _>>()?;
        slots.retain(Slot::is_available);
        Ok(slots)
    }

    pub async fn get(&self, slot_id: &str) -> Result<Option<Slot>, StoreError> {
        self.store
            .get(Collection::Slots, slot_id)
            .await?
            .map(|doc| Slot::from_document(&doc))
            .transpose()
    }

    pub async fn create(&self, new_slot: NewSlot) -> Result<String, SlotError> {
        new_slot.validate()?;
        let slot = new_slot.into_slot();

        let id = self.store.create(Collection::Slots, slot.to_fields()?).await?;
        info!("Slot {} created for doctor {} on {} at {}", id, slot.doctor_id, slot.date, slot.time);
        Ok(id)
    }

    /// Unconditionally flags the slot as booked.
    pub async fn mark_booked(&self, slot_id: &str) -> Result<(), StoreError> {
        debug!("Marking slot {} booked", slot_id);
        self.store
            .update(Collection::Slots, slot_id, booked_flag(true))
            .await
    }

    /// Flags the slot as booked only if it is currently open.
    ///
    /// Returns `false` when another booking got there first.
    pub async fn try_mark_booked(&self, slot_id: &str) -> Result<bool, StoreError> {
        let condition = Predicate::Eq(IS_BOOKED.to_string(), Value::Bool(false));
        let applied = self
            .store
            .update_if(Collection::Slots, slot_id, &condition, booked_flag(true))
            .await?;

        if !applied {
            warn!("Slot {} was already booked", slot_id);
        }
        Ok(applied)
    }

    pub async fn mark_available(&self, slot_id: &str) -> Result<(), StoreError> {
        debug!("Marking slot {} available", slot_id);
        self.store
            .update(Collection::Slots, slot_id, booked_flag(false))
            .await
    }

    pub async fn delete(&self, slot_id: &str) -> Result<(), SlotError> {
        self.store
            .delete(Collection::Slots, slot_id)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    SlotError::NotFound(slot_id.to_string())
                } else {
                    SlotError::Store(e)
                }
            })?;
        info!("Slot {} deleted", slot_id);
        Ok(())
    }
}

fn booked_flag(is_booked: bool) -> Fields {
    let mut fields = Fields::new();
    fields.insert(IS_BOOKED.to_string(), json!(is_booked));
    fields
}
