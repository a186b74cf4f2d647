//! End-to-end test support for SeoulMate
//!
//! - `mocks`: a fixture K-drama catalog and scripted collaborators
//! - `harness`: engines wired over the fixture catalog

pub mod harness;
pub mod mocks;
