//! Concrete acquisition strategies. Each one is an independent way of
//! turning a content id into audio bytes; the orchestrator decides which
//! to try and in what order.

mod direct;
mod mirror;
mod streaming;

pub use direct::DirectFormatStrategy;
pub use mirror::MirrorApiStrategy;
pub use streaming::StreamingChunkStrategy;
