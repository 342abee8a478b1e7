//! # TCM Common Library
//!
//! Shared code for the text chunk management tools:
//! - Error type and result alias
//! - Configuration resolution (CLI → ENV → TOML → defaults)
//! - Creation workflow event types and the broadcast `EventBus`

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
