// src/backend/adapter/mod.rs
// HTTPS-outcall implementations of the service ports.

pub mod aleo_program;
pub mod aleo_relay_adapter;
pub mod gemini_adapter;
pub mod http_outcall;
pub mod pinata_adapter;
pub mod presented_wallet;
pub mod stripe_adapter;
