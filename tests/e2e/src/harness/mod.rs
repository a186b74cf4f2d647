//! Engine construction for journey tests

mod engine_harness;

pub use engine_harness::EngineHarness;
