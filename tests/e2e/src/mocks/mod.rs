//! Fixture data and scripted collaborators

mod collaborators;
mod fixtures;
mod observers;

pub use collaborators::{
    BrokenRelevance, FailingLexical, FailingSemantic, FixedLexical, FixedSemantic,
    ReversingRelevance, SlowRelevance, TokenOverlapSemantic,
};
pub use fixtures::DramaFixtures;
pub use observers::{EventLog, PanickingObserver};
