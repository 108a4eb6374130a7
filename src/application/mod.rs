//! Application layer - Generic services that use ports.

pub mod listener;
pub mod pipeline;
