// src/config/mod.rs
pub mod backend;

pub use backend::BackendConfig;
