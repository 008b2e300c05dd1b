//! # Roster Sort
//!
//! Sorts event photos into per-participant folders. Each participant is
//! photographed holding a QR code; the photos that follow belong to them
//! until the next known code shows up.
//!
//! ## Core Philosophy
//! - **Never touch the originals** - photos are copied, never moved
//! - **Keep stream order** - grouping trusts the order it is given
//! - **Lose nothing** - every photo ends up in a group or the unassigned folder
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation layers:
//! - `core` - Roster, recognition, grouping, materialization and the pipeline
//! - `events` - Event-driven progress reporting, injected into each stage
//! - `error` - User-friendly error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{Result, RosterSortError};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. Logs go to stderr
/// so stdout stays free for JSON reports. `RUST_LOG` overrides the default
/// `warn` level.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
