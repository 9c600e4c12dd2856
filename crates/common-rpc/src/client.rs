use std::net::SocketAddr;

use futures::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio_util::codec::Framed;

use crate::codec::{ClientRequest, ClientResponse, JsonLineCodec};
use crate::RpcError;

type ClientFramed = Framed<TcpStream, JsonLineCodec<ClientResponse, ClientRequest>>;

/// A single connection to an RPC server.
///
/// Calls are issued one at a time; `call` takes `&mut self` so a client can
/// never have two requests in flight. There is no timeout: a server that
/// never answers blocks the call forever.
pub struct RpcClient {
    framed: ClientFramed,
    peer_addr: SocketAddr,
    next_id: u64,
}

impl RpcClient {
    /// Open a TCP connection to `addr`.
    pub async fn connect<A>(addr: A) -> Result<Self, RpcError>
    where
        A: ToSocketAddrs + std::fmt::Display,
    {
        let stream = TcpStream::connect(&addr)
            .await
            .map_err(|source| RpcError::Connect {
                addr: addr.to_string(),
                source,
            })?;
        Self::from_stream(stream)
    }

    /// Wrap an already connected stream.
    pub fn from_stream(stream: TcpStream) -> Result<Self, RpcError> {
        let peer_addr = stream.peer_addr()?;
        tracing::debug!(peer = %peer_addr, "rpc connection established");
        Ok(Self {
            framed: Framed::new(stream, JsonLineCodec::new()),
            peer_addr,
            next_id: 0,
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Invoke `method` (`"Service.Method"`) with `args` and decode the result.
    ///
    /// A failure reported by the server comes back as [`RpcError::Remote`].
    pub async fn call<A, R>(&mut self, method: &str, args: A) -> Result<R, RpcError>
    where
        A: Serialize,
        R: DeserializeOwned,
    {
        let id = self.next_id;
        self.next_id += 1;

        let request = ClientRequest {
            method: method.to_string(),
            params: Value::Array(vec![serde_json::to_value(args)?]),
            id,
        };
        tracing::debug!(peer = %self.peer_addr, method, id, "sending rpc request");
        self.framed.send(request).await?;

        let response = match self.framed.next().await {
            Some(frame) => frame?,
            None => return Err(RpcError::Closed),
        };
        if response.id != id {
            return Err(RpcError::UnexpectedResponse {
                expected: id,
                got: response.id,
            });
        }

        match response.error {
            None => {}
            Some(Value::String(message)) => {
                tracing::debug!(method, id, error = %message, "rpc call failed remotely");
                return Err(RpcError::Remote(message));
            }
            Some(other) => return Err(RpcError::Codec(format!("invalid error {other}"))),
        }

        let result = response.result.unwrap_or(Value::Null);
        Ok(serde_json::from_value(result)?)
    }

    /// Flush pending writes and shut the connection down.
    pub async fn close(self) -> Result<(), RpcError> {
        let mut stream = self.framed.into_inner();
        stream.shutdown().await?;
        tracing::debug!(peer = %self.peer_addr, "rpc connection closed");
        Ok(())
    }
}
