//! Request/response pipeline around the transport

mod layer;
mod logging;

pub use layer::{BoxedNext, ClientLayer, LayerStack, ResponseFuture};
pub use logging::{LogFormat, LoggingLayer};
