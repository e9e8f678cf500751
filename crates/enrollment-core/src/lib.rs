//! Enrollment and evaluation workflow engine for a cycle-based degree program.
//!
//! Students and courses are owned by the registry; the enrollment and evaluation
//! workflows only ever confirm them through an [`workflows::lookup::EntityLookup`],
//! which is either backed by the owning service's HTTP endpoints or, in a single
//! process, by the registry repositories directly.

pub mod config;
pub mod context;
pub mod error;
pub mod storage;
pub mod telemetry;
pub mod workflows;
