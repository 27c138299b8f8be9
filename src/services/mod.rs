pub mod bookings;
pub mod events;
pub mod notify;
pub mod sweeper;
pub mod users;
