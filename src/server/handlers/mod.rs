pub mod admin;
pub mod documents;
pub mod events;
pub mod search;
pub mod uploads;
