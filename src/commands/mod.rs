//! Command implementations
//!
//! Each module corresponds to one CLI action.

pub mod send_message;

pub use send_message::{run as send_message_run, SendOptions, DEFAULT_MESSAGE};
