//! Booking-availability engine.
//!
//! Pure, synchronous computation of bookable slots from plain rows: no I/O,
//! no shared state, no system-clock reads. Callers fetch a meeting type and
//! its availability/blackout/booking rows, then invoke
//! [`slots::compute_slots`] with the target date, the viewer's timezone and
//! an explicit `now` anchor (injected so tests are deterministic).

pub mod pattern;
pub mod slots;
pub mod timezone;

pub use pattern::pattern_hash;
pub use slots::{compute_slots, effective_time_zone, Slot};

/// Errors from the slot engine. Missing configuration is never an error
/// (absence of data means "closed"); only data-integrity problems like an
/// invalid IANA timezone identifier surface here.
#[derive(Debug, thiserror::Error)]
pub enum SlotError {
    #[error("Invalid IANA timezone identifier: {0}")]
    InvalidTimeZone(String),
}
