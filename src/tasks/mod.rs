//! Background Tasks Module
//!
//! Contains background tasks owned by long-lived components.
//!
//! # Tasks
//! - Reaper: removes expired cache entries, one task per cache instance

mod reaper;

pub(crate) use reaper::spawn_reaper;
