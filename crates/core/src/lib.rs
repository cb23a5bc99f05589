//! Pure domain logic for the live-presence monitor.
//!
//! No I/O lives here: storage and the external liveness signal are
//! reached only through the traits in [`store`] and [`probe`], so the
//! presence decision logic can be exercised against in-memory fakes.

pub mod error;
pub mod handle;
pub mod presence;
pub mod probe;
pub mod store;
pub mod types;
