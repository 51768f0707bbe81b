//! Crabgate - Local Message-Gateway Service
//!
//! A local gateway that bridges messaging channels to an agent backend.
//! This crate hosts the interactive setup wizard: a multi-step, branching,
//! resumable flow that configures network bind mode, authentication,
//! channel integrations, workspace, skills, and automation hooks, and
//! persists the result as a structured TOML document.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run the setup wizard
//! crabgate onboard
//!
//! # Non-interactive quickstart
//! crabgate onboard --flow quickstart --accept-risk --non-interactive
//!
//! # Inspect the resolved configuration
//! crabgate config
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod locale;
pub mod logging;
pub mod wizard;

// Re-export commonly used types
pub use error::WizardError;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
