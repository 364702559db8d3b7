//! Action/Reducer/Effect primitives.
//!
//! This module provides the generic pieces used to build a unidirectional
//! state machine: a pure reducer computes the next state plus a list of
//! declarative effects, and an interpreter outside the reducer executes them.
//!
//! # Architecture
//!
//! ```text
//! Action ──→ Reducer ──→ State
//!    ↑          │
//!    │          └──→ Effects ──→ EffectHandler
//!    └──────────────────────────────┘
//! ```
//!
//! - **State**: Immutable snapshot, replaced on every reduction
//! - **Action**: What happened (user input, network callback, timer)
//! - **Effect**: What should happen next, executed outside the reducer
//! - **Reducer**: Pure function `(State, Action) -> (State, Effects)`

mod action;
mod effect;
mod error;
mod machine;
mod reducer;
mod runtime;
mod state;
mod timer;

pub use action::Action;
pub use effect::{Effect, EffectHandler};
pub use error::{IllegalActionError, IllegalActionPolicy, MachineError};
pub use machine::StateMachine;
pub use reducer::{Reducer, ReducerResult};
pub use runtime::{ActionSender, MachineHandle, MachineRuntime};
pub use state::MachineState;
pub use timer::TimerRegistry;
