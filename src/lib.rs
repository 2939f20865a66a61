// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # infrasync
//!
//! Preview the changes needed to bring infrastructure from its current state
//! to a declared desired state, in the style of a `plan` step.
//!
//! ## Overview
//!
//! - Declare resources (`type`, `name`, arbitrary `properties`) in YAML
//! - Fetch the current state from a mock, a state file, or an HTTP endpoint
//! - Compute which resources would be created, updated or deleted, with
//!   property-level detail for updates
//!
//! Nothing is ever applied.
//!
//! ## Modules
//!
//! - [`config`]: Desired-state loading, validation and fingerprints
//! - [`state`]: Current-state providers
//! - [`planner`]: The comparison engine
//! - [`cli`]: Command-line interface and presenter
//!
//! ## Example
//!
//! ```yaml
//! version: "1.0"
//! resources:
//!   - type: server
//!     name: web-server-1
//!     properties:
//!       instance_type: t2.micro
//!       region: us-west-2
//!   - type: database
//!     name: main-db
//!     properties:
//!       engine: postgres
//!       version: "15.0"
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod planner;
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ConfigHasher, ConfigParser, ConfigValidator, Resource, SyncConfig};
pub use error::{Result, SyncError};
pub use planner::{ChangeType, Diff, DiffEngine, PropertyChange, ResourceChange};
pub use state::{
    FileStateProvider, HttpStateProvider, MockStateProvider, StateProvider, StateSource,
};
