//! flipbook — a terminal flipbook viewer for page-image documents.
//!
//! The library half is the viewer's state/layout engine: spread
//! partitioning ([`spread`]), responsive book geometry ([`layout`]),
//! zoom ([`zoom`]), autoplay ([`autoplay`]), the flip-engine seam
//! ([`flip`]), and the state machine tying them together ([`viewer`]).
//! Document sources live in [`library`]; the ratatui front end and the
//! CLI live in the binary.

pub mod autoplay;
pub mod config;
pub mod error;
pub mod flip;
pub mod layout;
pub mod library;
pub mod spread;
pub mod viewer;
pub mod zoom;

pub use error::{FlipbookError, Result};
