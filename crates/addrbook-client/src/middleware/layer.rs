//! Composable client middleware
//!
//! Every outgoing request passes through a [`LayerStack`] before it reaches
//! the transport, and every response passes back through it in reverse.
//! Layers see the request, decide whether to call `next`, and may inspect or
//! replace what comes back.

use crate::error::ClientError;
use crate::request::ApiRequest;
use crate::response::ApiResponse;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Future returned by layers and by the end of the chain.
pub type ResponseFuture =
    Pin<Box<dyn Future<Output = Result<ApiResponse, ClientError>> + Send + 'static>>;

/// A boxed next function for middleware chains
pub type BoxedNext = Arc<dyn Fn(ApiRequest) -> ResponseFuture + Send + Sync>;

/// Trait for middleware wrapped around every client request
pub trait ClientLayer: Send + Sync + 'static {
    /// Apply this middleware to a request, calling `next` to continue the chain
    fn call(&self, req: ApiRequest, next: BoxedNext) -> ResponseFuture;

    /// Clone this middleware into a boxed trait object
    fn clone_box(&self) -> Box<dyn ClientLayer>;
}

impl Clone for Box<dyn ClientLayer> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// An ordered stack of client layers
#[derive(Clone, Default)]
pub struct LayerStack {
    layers: Vec<Box<dyn ClientLayer>>,
}

impl LayerStack {
    /// Create a new empty layer stack
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Add a layer to the stack
    ///
    /// Layers run in the order they are added (first added is outermost).
    pub fn push(&mut self, layer: Box<dyn ClientLayer>) {
        self.layers.push(layer);
    }

    /// Check if the stack is empty
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Get the number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Run `req` through every layer and finally `transport`.
    pub fn execute(&self, req: ApiRequest, transport: BoxedNext) -> ResponseFuture {
        if self.layers.is_empty() {
            return transport(req);
        }

        // Build from the inside out so the first layer ends up outermost.
        let mut next = transport;
        for layer in self.layers.iter().rev() {
            let layer: Arc<dyn ClientLayer> = Arc::from(layer.clone_box());
            let inner = next;
            next = Arc::new(move |req: ApiRequest| layer.call(req, inner.clone()));
        }

        next(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, Method, StatusCode};
    use reqwest::Url;
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    #[derive(Clone)]
    struct Recording {
        id: &'static str,
        log: Log,
    }

    impl ClientLayer for Recording {
        fn call(&self, req: ApiRequest, next: BoxedNext) -> ResponseFuture {
            let id = self.id;
            let log = self.log.clone();
            Box::pin(async move {
                log.lock().unwrap().push(format!("{id}:pre"));
                let resp = next(req).await;
                log.lock().unwrap().push(format!("{id}:post"));
                resp
            })
        }

        fn clone_box(&self) -> Box<dyn ClientLayer> {
            Box::new(self.clone())
        }
    }

    #[derive(Clone)]
    struct ShortCircuit;

    impl ClientLayer for ShortCircuit {
        fn call(&self, _req: ApiRequest, _next: BoxedNext) -> ResponseFuture {
            Box::pin(async {
                Ok::<_, ClientError>(ApiResponse::new(
                    StatusCode::IM_A_TEAPOT,
                    HeaderMap::new(),
                    "short",
                ))
            })
        }

        fn clone_box(&self) -> Box<dyn ClientLayer> {
            Box::new(self.clone())
        }
    }

    fn request() -> ApiRequest {
        ApiRequest::new(
            Method::GET,
            "/login",
            Url::parse("http://localhost:8080/api/login").unwrap(),
        )
    }

    fn transport(log: Log) -> BoxedNext {
        Arc::new(move |_req: ApiRequest| {
            let log = log.clone();
            Box::pin(async move {
                log.lock().unwrap().push("transport".to_string());
                Ok::<_, ClientError>(ApiResponse::new(StatusCode::OK, HeaderMap::new(), "ok"))
            }) as ResponseFuture
        })
    }

    #[tokio::test]
    async fn test_empty_stack_calls_transport() {
        let log = Log::default();
        let stack = LayerStack::new();
        let resp = stack.execute(request(), transport(log.clone())).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(*log.lock().unwrap(), vec!["transport"]);
    }

    #[tokio::test]
    async fn test_layers_run_in_insertion_order() {
        let log = Log::default();
        let mut stack = LayerStack::new();
        stack.push(Box::new(Recording { id: "a", log: log.clone() }));
        stack.push(Box::new(Recording { id: "b", log: log.clone() }));
        assert_eq!(stack.len(), 2);

        stack.execute(request(), transport(log.clone())).await.unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:pre", "b:pre", "transport", "b:post", "a:post"]
        );
    }

    #[tokio::test]
    async fn test_layer_can_short_circuit() {
        let log = Log::default();
        let mut stack = LayerStack::new();
        stack.push(Box::new(Recording { id: "a", log: log.clone() }));
        stack.push(Box::new(ShortCircuit));

        let resp = stack.execute(request(), transport(log.clone())).await.unwrap();
        assert_eq!(resp.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(*log.lock().unwrap(), vec!["a:pre", "a:post"]);
    }

    #[tokio::test]
    async fn test_stack_is_reusable() {
        let log = Log::default();
        let mut stack = LayerStack::new();
        stack.push(Box::new(Recording { id: "a", log: log.clone() }));

        stack.execute(request(), transport(log.clone())).await.unwrap();
        stack.execute(request(), transport(log.clone())).await.unwrap();
        assert_eq!(log.lock().unwrap().len(), 6);
    }
}
