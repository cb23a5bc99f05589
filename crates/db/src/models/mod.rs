//! Row structs and DTOs for the monitor's tables.

pub mod creator;
pub mod presence;
pub mod session;
