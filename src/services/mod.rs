pub mod fs;
#[cfg(feature = "runtime")]
pub mod tracing_setup;
