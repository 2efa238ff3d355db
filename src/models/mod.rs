pub mod booking;

pub use booking::{Booking, BookingFilter, BookingForm, BookingStatus, NewBooking};
