//! Portico Core — shared domain abstractions.
//!
//! This crate defines the fundamental types that the analytics and API
//! crates depend on. It contains no infrastructure code.

pub mod clock;
pub mod error;
pub mod event;
pub mod timeframe;
