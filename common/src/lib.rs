pub mod config;
pub mod directory;
pub mod network;
pub mod scanning;
pub mod sending;
pub mod sink;
pub mod status;
pub mod vendors;
pub mod wake;

#[doc(hidden)]
pub use tracing as __tracing;

/// Logs a positive outcome on the `lanwake::success` target, which the CLI
/// formatter renders with its own symbol.
#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        $crate::__tracing::info!(target: "lanwake::success", $($arg)+)
    };
}
