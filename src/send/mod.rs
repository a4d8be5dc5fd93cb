//! Delivery: transport sessions, pacing, and the batch run.

pub mod batch;
pub mod session;
pub mod throttle;
