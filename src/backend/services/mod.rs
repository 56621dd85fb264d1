// src/backend/services/mod.rs

pub mod enhance_service;
pub mod payment_service;
pub mod ports;
pub mod scheduler;
pub mod session_service;
pub mod vault_service;
