pub mod appointment;
pub mod booking;
pub mod calendar;
pub mod date_range;
pub mod room;

pub use appointment::{AppointmentRecord, CustomerRecord, DateTimeTimeZone, ServiceRecord};
pub use booking::{
    Booking, CheckAvailabilityRequest, CreateBookingRequest, GuestInfo, UpdateBookingRequest,
};
pub use calendar::{CalendarAvailabilityResponse, CalendarDay, CheckAvailabilityResponse};
pub use date_range::DateRange;
pub use room::RoomType;
