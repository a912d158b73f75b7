//! Centralized error type for the blemidi umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Codec(#[from] blemidi_codec::Error),

    #[cfg(feature = "input")]
    #[error("Input: {0}")]
    Input(#[from] blemidi_input::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
