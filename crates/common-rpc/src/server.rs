use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio_util::codec::Framed;
use tracing::Instrument;

use crate::codec::{JsonLineCodec, ServerRequest, ServerResponse};
use crate::RpcError;

/// Failure returned by a service method.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unknown method")]
    UnknownMethod,
    #[error("invalid params: {0}")]
    InvalidParams(String),
    /// Application level failure; the message is sent to the caller verbatim.
    #[error("{0}")]
    Failed(String),
}

/// A named group of methods reachable as `"<name>.<Method>"`.
#[async_trait]
pub trait RpcService: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Run `method` with the single positional parameter sent by the caller.
    async fn call(&self, method: &str, params: Value) -> Result<Value, ServiceError>;
}

type Services = HashMap<String, Arc<dyn RpcService>>;

/// Accepts connections and dispatches requests to registered services.
///
/// Every connection runs in its own task; requests on one connection are
/// answered in the order they arrive.
pub struct RpcServer {
    listener: TcpListener,
    services: Services,
}

impl RpcServer {
    pub async fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self, RpcError> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            services: HashMap::new(),
        })
    }

    /// Register a service under its own name, replacing any previous one.
    pub fn register(&mut self, service: Arc<dyn RpcService>) -> &mut Self {
        self.services.insert(service.name().to_string(), service);
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr, RpcError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the listener fails.
    pub async fn serve(self) -> Result<(), RpcError> {
        let services = Arc::new(self.services);
        tracing::info!(
            listen_addr = %self.listener.local_addr()?,
            services = services.len(),
            "rpc server accepting connections"
        );

        loop {
            let (stream, peer) = self.listener.accept().await?;
            let services = services.clone();
            let span = tracing::info_span!("rpc_connection", %peer);
            tokio::spawn(
                async move {
                    if let Err(err) = handle_connection(stream, services).await {
                        tracing::warn!(error = %err, "rpc connection ended with error");
                    }
                }
                .instrument(span),
            );
        }
    }
}

async fn handle_connection(stream: TcpStream, services: Arc<Services>) -> Result<(), RpcError> {
    let mut framed = Framed::new(stream, JsonLineCodec::<ServerRequest, ServerResponse>::new());
    tracing::debug!("rpc connection accepted");

    while let Some(frame) = framed.next().await {
        let request = frame?;
        let response = dispatch(&services, request).await;
        framed.send(response).await?;
    }

    tracing::debug!("rpc connection closed by peer");
    Ok(())
}

async fn dispatch(services: &Services, request: ServerRequest) -> ServerResponse {
    let ServerRequest { method, params, id } = request;

    let Some((service_name, method_name)) = method.rsplit_once('.') else {
        return ServerResponse::error(
            id,
            format!("rpc: service/method request ill-formed: {method}"),
        );
    };
    let Some(service) = services.get(service_name) else {
        return ServerResponse::error(id, format!("rpc: can't find service {method}"));
    };
    let param = match params {
        Some(Value::Array(mut values)) if !values.is_empty() => values.swap_remove(0),
        Some(Value::Array(_)) | Some(Value::Null) | None => {
            return ServerResponse::error(id, "jsonrpc: request body missing params");
        }
        Some(other) => other,
    };

    match service.call(method_name, param).await {
        Ok(result) => ServerResponse::result(id, result),
        Err(ServiceError::UnknownMethod) => {
            ServerResponse::error(id, format!("rpc: can't find method {method}"))
        }
        Err(err) => {
            tracing::debug!(%method, error = %err, "rpc method failed");
            ServerResponse::error(id, err.to_string())
        }
    }
}
