//! Test helpers for cachetime-server.

#![allow(dead_code, unused_imports)]

pub mod client;
pub mod fixtures;

pub use client::{TestClient, TestResponse};
pub use fixtures::*;
