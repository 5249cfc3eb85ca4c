//! Utility functions for the table extraction pipeline.
//!
//! This module provides image loading and cropping helpers used throughout
//! the pipeline, along with logging setup.

pub mod crop;
pub mod image;

// Re-export cropping and loading helpers
pub use crop::crop_region;
pub use image::load_image;

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and
/// formatting layer. It's typically called at the start of an application to
/// enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
