//! Ports - Trait definitions the application layer depends on.

pub mod command;
pub mod media;
pub mod notifier;
pub mod storage;
