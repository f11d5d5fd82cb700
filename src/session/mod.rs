//! Generation runs: configuration, scene sequencing and the run state machine.

pub mod config;
pub mod run;
pub mod sequencer;
