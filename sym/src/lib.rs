//! Symbolic term algebra and solver boundary for the heap consumption
//! engine. Terms are immutable Arc-shared trees; the solver is consumed
//! through the `Decider` trait, with `GroundDecider` as a deterministic
//! implementation for ground reasoning.

pub mod ast;
pub mod ast_util;
pub mod decider;
pub mod emitter;
pub mod ground;
pub mod messages;
#[macro_use]
pub mod printer;
pub mod visitor;
