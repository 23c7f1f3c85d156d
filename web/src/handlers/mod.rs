//! HTTP request handlers, organized by resource.

pub mod events;
pub mod health;
pub mod interactions;
pub mod ratings;
pub mod waitlist;

pub use health::health_check;
