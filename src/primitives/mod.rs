//! Low-level primitives and utilities

pub mod language;
