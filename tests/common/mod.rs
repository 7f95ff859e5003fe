//! Common test utilities for pipeline integration tests.

#![allow(dead_code)]

mod connector;
mod fixtures;

pub use connector::*;
pub use fixtures::*;
