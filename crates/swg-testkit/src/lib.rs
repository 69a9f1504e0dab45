//! # SWG Testkit
//!
//! Shared testing utilities for the SWG crates: paired-session
//! fixtures, a recording renderer, a scripted player driver, and
//! proptest generators.

pub mod fixtures;
pub mod generators;

pub use fixtures::{
    paired_match, FixtureSide, RecordingRenderer, RenderEvent, RenderLog, ScriptedPlayer,
};
