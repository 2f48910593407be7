//! Core types for the TurboNET command bridge.
//!
//! This crate defines the data structures shared by the credential store,
//! the API client and the command router. It contains no business logic.

pub mod api;
pub mod config;
pub mod error;
