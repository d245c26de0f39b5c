//! Integration tests for mqtt-recorder
//!
//! These tests verify that multiple components work together correctly.

#[path = "../common/mod.rs"]
pub mod common;

pub mod capture_replay;
pub mod cli;
pub mod store_layout;
