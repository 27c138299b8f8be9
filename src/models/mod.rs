pub mod user;
pub mod event;
pub mod booking;

pub use user::{User, UserRole};
pub use event::{Event, EventStatus};
pub use booking::{Booking, BookingStatus, BookingView};
