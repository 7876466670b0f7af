//! Data Transfer Objects (DTOs) for the HTTP API.
//!
//! The websocket stream carries `michi_shared::DisplayUpdate` directly.

pub mod http;
