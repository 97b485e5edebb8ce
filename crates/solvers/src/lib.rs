//! Simulation master algorithms for the Strand framework.
//!
//! # Modules
//!
//! - [`transient`]: solvers that drive hybrid models through time

pub mod transient;
