pub mod auth;
pub mod booking;
pub mod format;
pub mod validation;
