//! Client facade over the synthesis pipeline.
//!
//! Keep the public surface small: one client, one builder. The pieces it wires
//! together (gateway, codec, playback, delivery) are public in their own
//! modules for callers who need finer control.

mod builder;
mod core;

pub use builder::SupertonicClientBuilder;
pub use core::SupertonicClient;
