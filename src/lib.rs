//! Provider smoke tests and local model selection.

pub mod commands;
pub mod config;
pub mod rchain;
pub mod selection;
pub mod telemetry;

/// Version string with the build metadata captured by `build.rs`.
pub const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit: ",
    env!("LLMKIT_GIT_SHA"),
    ", built: ",
    env!("LLMKIT_BUILD_TS"),
    ")"
);
