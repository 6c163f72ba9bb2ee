//! # burner_core - Gas Burner & Combustion Chamber Design Engine
//!
//! `burner_core` sizes a gas burner port and its combustion chamber for a
//! requested thermal power, estimates flame radiation inside the chamber,
//! computes pressure losses in the gas supply line and checks the result
//! against engineering limits. All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: components borrow an immutable [`FuelCatalog`] and are pure
//!   functions of their inputs
//! - **JSON-First**: all inputs, results and settings implement Serialize/Deserialize
//! - **Rich Errors**: one structured [`DesignError`] enum, never strings
//! - **Codes, not prose**: validation returns criterion flags and
//!   recommendation codes; [`messages`] renders them in English or Czech
//!
//! ## Quick Start
//!
//! ```rust
//! use burner_core::{DesignPipeline, DesignSettings, FuelCatalog, PipelineInput};
//!
//! let catalog = FuelCatalog::builtin().unwrap();
//! let settings = DesignSettings::default();
//! let input = PipelineInput {
//!     target_velocity: Some(5.0),
//!     ..PipelineInput::new("methane", 100_000.0, 3000.0)
//! };
//!
//! let report = DesignPipeline::new(&catalog, &settings).run(&input).unwrap();
//! println!("Burner diameter: {:.1} mm", report.burner.diameter * 1000.0);
//! ```
//!
//! ## Modules
//!
//! - [`catalog`] - Fuel properties, physical constants, material emissivities
//! - [`combustion`] - Air demand, flue gas flow, flame temperature
//! - [`burner`] - Burner port sizing
//! - [`chamber`] - Combustion chamber sizing and wall heat balance
//! - [`radiation`] - Flame and surface radiation
//! - [`flow_network`] - Gas piping pressure losses and diameter selection
//! - [`validation`] - Pass/fail criteria and recommendation codes
//! - [`messages`] - Localized message tables
//! - [`pipeline`] - The full design chain, single and batch
//! - [`project`] - Project container, metadata and settings
//! - [`file_io`] - Atomic project saves, catalog loading
//! - [`units`] - Unit wrappers for input and display
//! - [`errors`] - Structured error types

pub mod burner;
pub mod catalog;
pub mod chamber;
pub mod combustion;
pub mod errors;
pub mod file_io;
pub mod flow_network;
pub mod messages;
pub mod pipeline;
pub mod project;
pub mod radiation;
pub mod units;
pub mod validation;

pub use catalog::{FuelCatalog, FuelFamily};
pub use errors::{CalcResult, DesignError, ErrorCategory};
pub use file_io::{load_catalog, load_project, save_project};
pub use messages::{Locale, MessageTable};
pub use pipeline::{DesignPipeline, PipelineInput, PipelineReport};
pub use project::{DesignCase, DesignProject, DesignSettings, ProjectMetadata};
