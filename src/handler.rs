//! Handler storage.
//!
//! The router keeps handlers of *different* closure types in one
//! `HashMap<String, BoxedHandler>`. A collection holds a single concrete type,
//! so every handler is hidden behind the same trait object:
//!
//! ```text
//! |ctx: &mut Context| ctx.string(..)    ← user writes this
//!        ↓ engine.get("/", handler)
//! Arc::new(handler)                     ← stored as BoxedHandler
//!        ↓
//! (handler)(&mut ctx)  per request      ← one vtable dispatch
//! ```
//!
//! Registration methods bound their argument on `Fn(&mut Context)` directly
//! rather than on a named trait, so closures get their argument type inferred
//! without annotations.
//!
//! Handlers are synchronous and run on the connection's task. They should not
//! block for long; anything slow belongs on a thread of its own.

use std::sync::Arc;

use crate::context::Context;

/// A type-erased handler shared by every connection task.
pub(crate) type BoxedHandler = Arc<dyn Fn(&mut Context) + Send + Sync + 'static>;

pub(crate) fn boxed<F>(handler: F) -> BoxedHandler
where
    F: Fn(&mut Context) + Send + Sync + 'static,
{
    Arc::new(handler)
}
