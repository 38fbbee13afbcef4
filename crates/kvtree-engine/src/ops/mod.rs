//! Multi-node operations on [`KvTree`](crate::KvTree).
//!
//! Each submodule adds an `impl KvTree` block. None of them is atomic: every
//! step is an independent, retried store call, and a failure leaves whatever
//! was already written in place.

pub mod batch;
pub mod delete;
pub mod exchange;
pub mod relocate;
pub mod stats;
pub mod traverse;
