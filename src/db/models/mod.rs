//! Database models split into separate files.
//! This module re-exports individual model modules so callers can import
//! everything through `crate::db::models`.

pub mod availability;
pub mod blackout;
pub mod booking;
pub mod meeting_type;
pub mod schedule_settings;

pub use self::availability::*;
pub use self::blackout::*;
pub use self::booking::*;
pub use self::meeting_type::*;
pub use self::schedule_settings::*;
