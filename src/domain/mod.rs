//! Domain layer - Pure business logic.

pub mod events;
pub mod layout;
pub mod manifest;
pub mod media;
pub mod outcome;
pub mod planner;
pub mod thumbnail;
