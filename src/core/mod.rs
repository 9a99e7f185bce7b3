//! Core services and infrastructure

pub mod error_handling;
pub mod logging;
pub mod services;
pub mod settings;
pub mod strings;
pub mod styles;
pub mod sync;
pub mod version;
