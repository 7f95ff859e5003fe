//! Core infrastructure: environment, settings, errors, output and locking.

pub mod config;
pub mod env;
pub mod error;
pub mod lock;
pub mod output;
