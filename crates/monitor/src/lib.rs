//! The polling daemon: configuration, the HTTP liveness prober, and the
//! cycle scheduler that drives the presence state machine.

pub mod config;
pub mod prober;
pub mod scheduler;
