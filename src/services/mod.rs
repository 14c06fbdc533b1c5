pub mod auth;
pub mod availability;
pub mod booking;
pub mod conflicts;
pub mod email;
pub mod mapper;
pub mod provider;
