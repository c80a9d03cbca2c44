//! Device-to-cloud forwarding of merged records.

mod client;
mod connection_string;
mod iothub;
mod sink;

pub use client::*;
pub use connection_string::*;
pub use iothub::*;
pub use sink::*;
