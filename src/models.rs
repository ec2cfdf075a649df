// src/models.rs

pub mod appointment;
pub mod auth;
pub mod business;
pub mod catalog;
pub mod customer;
pub mod order;
pub mod settings;
pub mod uploads;
