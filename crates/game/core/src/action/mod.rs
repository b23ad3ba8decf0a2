//! Action domain: the closed set of kinds, their argument shapes, and the
//! behaviors registered for them.
//!
//! # Module Structure
//!
//! - `kind`: [`ActionKind`] and the tagged [`ActionArgs`]
//! - `transition`: the [`ActionTransition`] capability interface and the
//!   contexts handed to it
//! - `registry`: [`ActionRegistry`], one behavior per kind, checked at startup
//! - `kinds`: the built-in behaviors
//! - `result`: messages, notifications and [`ActionResult`]
//! - `error`: [`ActionRejected`]

mod error;
mod kind;
pub mod kinds;
mod registry;
mod result;
mod transition;

pub use error::{ActionRejected, ensure};
pub use kind::{ActionArgs, ActionArguments, ActionKind};
pub use kinds::*;
pub use registry::{ActionDescriptor, ActionRegistry, Capabilities};
pub use result::{ActionResult, ActionStatus, Message, MessageLevel, Report};
pub use transition::{ActionBehavior, ActionContext, ActionTransition, EffectContext};
