//! Current-state module for infrasync.
//!
//! This module provides the sources of the observed infrastructure state:
//! a static mock, recorded state files, and remote HTTP endpoints, all
//! behind the [`StateProvider`] capability.

mod provider;
mod mock;
mod local;
mod http;
mod source;

pub use provider::StateProvider;
pub use mock::MockStateProvider;
pub use local::FileStateProvider;
pub use http::HttpStateProvider;
pub use source::StateSource;
