//! Greeting handler for edge/serverless hosts.
//!
//! [`event_handler::handle`] is the host-independent contract; the binary
//! wires [`event_handler::function_handler`] into the Lambda runtime.

pub mod config;
pub mod error;
pub mod event_handler;
