// src/handlers.rs

pub mod appointments;
pub mod auth;
pub mod categories;
pub mod customers;
pub mod order_status;
pub mod orders;
pub mod products;
pub mod public;
pub mod settings;
pub mod uploads;
pub mod users;
