//! Application layer: the query pipeline wiring the services together.

pub mod pipeline;

pub use pipeline::QueryPipeline;
