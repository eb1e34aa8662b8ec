// Explorer library - exposes all core modules for the binary and tests

pub mod app;
pub mod config;
#[cfg(feature = "runtime")]
pub mod config_io;
pub mod error;
pub mod input;
pub mod model;
pub mod primitives;
pub mod services;
pub mod view;
