//! Game simulation modules

pub mod actor;
pub mod ai;
pub mod combat;
pub mod input;
pub mod physics;
pub mod round;
pub mod runner;
pub mod snapshot;

pub use actor::{Actor, ActorState, AttackKind, DeviceClass, Facing};
pub use ai::{AiState, OpponentController, RandomSource, ScriptedRandom};
pub use input::{HeldInputs, InputSource};
pub use round::{
    FrameEvent, FrameReport, FrameResult, MatchSetup, RoundObserver, RoundOutcome, RoundPhase,
    RoundSession,
};
pub use runner::{RoundRunner, TracingObserver};
