pub mod facility;
pub mod reminders;
pub mod schedule;
