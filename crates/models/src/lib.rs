//! Reference models for the Strand simulation master.
//!
//! Each model implements [`ModelExchange`](strand_core::ModelExchange)
//! natively and provides its [`ModelDescription`](strand_core::ModelDescription).
//! Together they exercise every event path of the master:
//!
//! - [`Decay`]: one state with a constant slope and no events.
//! - [`BouncingBall`]: a falling ball whose bounces are state events.
//! - [`Ticker`]: a stateless counter driven by periodic time events.

mod bouncing_ball;
mod decay;
mod instance;
mod ticker;

pub use bouncing_ball::{BallInstance, BouncingBall};
pub use decay::{Decay, DecayInstance};
pub use ticker::{Ticker, TickerInstance};

/// Log categories the reference models understand.
pub const LOG_CATEGORIES: [&str; 2] = ["logEvents", "logStatusError"];
