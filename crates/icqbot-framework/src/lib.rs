//! # icqbot Framework
//!
//! The consumer side of the pipeline:
//! - [`HandlerTable`]: one async handler per event kind plus an error
//!   handler, frozen by [`HandlerTableBuilder::build`] before activation
//! - [`Dispatcher`]: decodes each event and routes it to its handler

pub mod dispatcher;
pub mod handler;

pub use dispatcher::{Dispatch, DispatchSummary, Dispatcher, UnknownKindPolicy};
pub use handler::{BoxFuture, Callback, ErrorCallback, HandlerTable, HandlerTableBuilder};
