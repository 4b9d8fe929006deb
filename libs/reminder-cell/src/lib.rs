pub mod models;
pub mod services;

pub use models::*;
pub use services::facility::{AlarmFacility, InMemoryAlarmFacility};
pub use services::reminders::ReminderService;
pub use services::schedule::ReminderSchedule;
