//! Acquisition Coordinator (C7), plus the ambient configuration and event
//! machinery it's built on. This is the crate an embedder depends on
//! directly; everything else in the workspace is a component it composes.

mod config;
mod coordinator;
mod events;
mod tracking_store;

pub use config::AcquisitionConfig;
pub use coordinator::Coordinator;
pub use events::{Event, EventSink, NoopEventSink, TracingEventSink};
