//! Tipos de entrada y salida del evaluador.

mod context;
mod invocation;
mod outcome;

pub use context::{ResolutionContext, SlotBinding};
pub use invocation::{Invocation, InvocationArg};
pub use outcome::{ResolveOutcome, ResolvedSelection, SkipReason};
