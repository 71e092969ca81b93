//! Daemon subsystem: main poll loop and signal-driven shutdown.

pub mod loop_main;
pub mod signals;

pub use loop_main::{CycleFailure, CyclePhase, CycleReport, PollLoop};
pub use signals::{ShutdownHandle, ShutdownSignal};
