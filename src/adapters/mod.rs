//! Adapters - Concrete implementations of ports.

pub mod catalog;
pub mod ffmpeg;
pub mod http;
pub mod packager;
pub mod process;
pub mod storage;
