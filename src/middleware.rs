// src/middleware.rs

pub mod auth;
pub mod rbac;
pub mod staff_self;
