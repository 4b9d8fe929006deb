pub mod booking;
pub mod lifecycle;

pub use booking::AppointmentCoordinator;
pub use lifecycle::StatusReconciler;
