// src/common.rs

pub mod error;
pub mod money;
pub mod response;
pub mod slug;
