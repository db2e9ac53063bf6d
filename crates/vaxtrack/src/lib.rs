//! VaxTrack core: the vaccine catalog, per-child schedule generation, and
//! the appointment/payment lifecycles that fulfill a child's schedule.
//!
//! Storage is abstracted behind per-module repository traits so the
//! services can be exercised in isolation; the `services/api` crate wires
//! in-memory implementations and the HTTP/CLI surface.

pub mod appointments;
pub mod catalog;
pub mod children;
pub mod config;
pub mod error;
pub mod payments;
pub mod scheduling;
pub mod store;
pub mod telemetry;
