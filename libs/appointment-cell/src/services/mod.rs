pub mod availability;
pub mod booking;
pub mod lifecycle;
pub mod timeslot;

pub use availability::AvailabilityService;
pub use booking::BookingService;
pub use lifecycle::AppointmentLifecycleService;
