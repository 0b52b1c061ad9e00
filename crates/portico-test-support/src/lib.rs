//! Shared test mocks and utilities for the Portico business directory.

mod clock;

pub use clock::{FixedClock, SteppingClock};
