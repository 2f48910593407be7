//! Command bridge for the TurboNET arcade network.
//!
//! Turns chat command text into TurboNET API calls and renders the JSON
//! responses as fixed-layout text replies. The messaging platform only has
//! to hand over `(user_id, text)` and send back whatever
//! [`bridge::CommandBridge::handle_message`] returns.

pub mod auth;
pub mod bridge;
pub mod client;
pub mod commands;
pub mod formatter;
