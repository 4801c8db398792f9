//! Axum extractors for request handling

mod path;
mod validated;

pub use path::PollIdPath;
pub use validated::ValidatedJson;
