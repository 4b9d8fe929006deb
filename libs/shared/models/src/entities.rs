// Plain attribute bags owned by their collections. Only id references tie them
// together and those references are not enforced.

use serde::{Deserialize, Serialize};

use crate::document::{entity_from_serde, fields_from_serde, Collection, Document, DocumentMapped, Fields};
use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub phone: Option<String>,
}

fn default_role() -> String {
    "patient".to_string()
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub specialization: String,
    #[serde(default)]
    pub hospital: Option<String>,
    #[serde(default)]
    pub experience_years: Option<i64>,
    #[serde(default)]
    pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub file_url: String,
    pub uploaded_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    pub medicine_name: String,
    /// Local time of day, `HH:mm`.
    pub time: String,
    #[serde(default)]
    pub dosage: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub relation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellnessResource {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl DocumentMapped for User {
    const COLLECTION: Collection = Collection::Users;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_fields(&self) -> Result<Fields, StoreError> {
        fields_from_serde(self)
    }

    fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let user: User = entity_from_serde(doc)?;
        if user.email.trim().is_empty() {
            return Err(StoreError::mapping(format!("user {} has an empty email", doc.id)));
        }
        Ok(user)
    }
}

impl DocumentMapped for Doctor {
    const COLLECTION: Collection = Collection::Doctors;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_fields(&self) -> Result<Fields, StoreError> {
        fields_from_serde(self)
    }

    fn from_document(doc: &Document) -> Result<Self, StoreError> {
        entity_from_serde(doc)
    }
}

impl DocumentMapped for MedicalRecord {
    const COLLECTION: Collection = Collection::MedicalRecords;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_fields(&self) -> Result<Fields, StoreError> {
        fields_from_serde(self)
    }

    fn from_document(doc: &Document) -> Result<Self, StoreError> {
        entity_from_serde(doc)
    }
}

impl DocumentMapped for Reminder {
    const COLLECTION: Collection = Collection::Reminders;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_fields(&self) -> Result<Fields, StoreError> {
        fields_from_serde(self)
    }

    fn from_document(doc: &Document) -> Result<Self, StoreError> {
        entity_from_serde(doc)
    }
}

impl DocumentMapped for EmergencyContact {
    const COLLECTION: Collection = Collection::EmergencyContacts;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_fields(&self) -> Result<Fields, StoreError> {
        fields_from_serde(self)
    }

    fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let contact: EmergencyContact = entity_from_serde(doc)?;
        if contact.phone.trim().is_empty() {
            return Err(StoreError::mapping(format!(
                "emergency contact {} has no phone number",
                doc.id
            )));
        }
        Ok(contact)
    }
}

impl DocumentMapped for WellnessResource {
    const COLLECTION: Collection = Collection::WellnessResources;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_fields(&self) -> Result<Fields, StoreError> {
        fields_from_serde(self)
    }

    fn from_document(doc: &Document) -> Result<Self, StoreError> {
        entity_from_serde(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fields_use_camel_case_and_drop_id() {
        let reminder = Reminder {
            id: "r1".into(),
            user_id: "u1".into(),
            medicine_name: "Metformin".into(),
            time: "08:30".into(),
            dosage: Some("500mg".into()),
        };

        let fields = reminder.to_fields().unwrap();
        assert!(fields.get("id").is_none());
        assert_eq!(fields.get("medicineName"), Some(&json!("Metformin")));
        assert_eq!(fields.get("userId"), Some(&json!("u1")));
    }

    #[test]
    fn test_from_document_restores_id() {
        let fields = match json!({ "name": "Dr. Mehta", "specialization": "Cardiology" }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        let doctor = Doctor::from_document(&Document::new("d1", fields)).unwrap();

        assert_eq!(doctor.id, "d1");
        assert_eq!(doctor.specialization, "Cardiology");
        assert_eq!(doctor.hospital, None);
    }

    #[test]
    fn test_boundary_validation() {
        let fields = match json!({ "userId": "u1", "name": "Asha", "phone": "  " }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        let result = EmergencyContact::from_document(&Document::new("c1", fields));
        assert!(matches!(result, Err(StoreError::Mapping(_))));
    }

    #[test]
    fn test_user_role_defaults_to_patient() {
        let fields = match json!({ "name": "Ravi", "email": "ravi@example.com" }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        let user = User::from_document(&Document::new("u1", fields)).unwrap();
        assert_eq!(user.role, "patient");
        assert!(!user.is_admin());
    }
}
