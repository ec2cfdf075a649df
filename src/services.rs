// src/services.rs

pub mod access;
pub mod pricing;

pub mod appointment_service;
pub mod auth;
pub mod catalog_service;
pub mod customer_service;
pub mod mailer;
pub mod order_service;
pub mod order_status_service;
pub mod settings_service;
pub mod uploads;
pub mod user_service;

#[cfg(test)]
mod db_tests;
