//! # Stonepath
//!
//! Placement engines for decorating vector designs: curve fills that repeat
//! elements along a path, rhinestone layouts (honeycomb grid, random scatter,
//! image-driven), object arrays and distribution.
//!
//! ## Architecture
//!
//! Stonepath is organized as a workspace with multiple crates:
//!
//! 1. **stonepath-core** - Points, bounding boxes, geometry kernel, units, errors
//! 2. **stonepath-designer** - Curve sampler, spatial hash, host traits and
//!    every placement engine
//! 3. **stonepath-settings** - Configuration with JSON/TOML persistence
//! 4. **stonepath** - Logging setup, the job runner and the `stonepath` binary
//!
//! ## Features
//!
//! - **Curve Fill**: fixed, percentage, auto-fit and random spacing; follow,
//!   fixed, random, incremental and perpendicular angles; element patterns and
//!   scale gradients
//! - **Rhinestones**: hexagonal and random fills with weighted multi-size
//!   stones, image maps, CSV/JSON/GDS exports
//! - **Arrays & Distribution**: linear, grid, circular and path arrays; even
//!   and random distribution
//! - **Jobs**: JSON job files run one after another from the command line

pub mod job;

pub use stonepath_designer as designer;
pub use stonepath_settings as settings;

pub use job::{load_job, run_job, run_job_file, run_jobs, Job, JobReport, Operation};
pub use stonepath_core::{Bounds, Error, LengthUnit, Point, Result};
pub use stonepath_settings::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Output on stderr, so job output on stdout stays clean
/// - RUST_LOG environment variable support, falling back to `level`
/// - Human-readable or JSON lines
pub fn init_logging(level: &str, json: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr).with_target(true))
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .with_line_number(true),
            )
            .try_init()?;
    }

    Ok(())
}
