//! JSON-RPC over newline-delimited TCP streams.
//!
//! Each request is a single line
//! `{"method":"Service.Method","params":[args],"id":n}` and each response is
//! `{"id":n,"result":value,"error":null|"message"}`.

mod client;
mod codec;
pub mod demo;
mod server;

use std::io;

use thiserror::Error;

pub use client::RpcClient;
pub use codec::{ClientRequest, ClientResponse, JsonLineCodec, ServerRequest, ServerResponse, MAX_LINE_LENGTH};
pub use server::{RpcServer, RpcService, ServiceError};

/// Errors that can occur while talking to an RPC peer.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The TCP connection could not be established.
    #[error("unable to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
    /// Reading from or writing to the stream failed.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
    /// A frame could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(String),
    /// The remote side reported a failure. Displays the remote message as is.
    #[error("{0}")]
    Remote(String),
    /// The peer answered a call that was never made.
    #[error("unexpected response id {got}, waiting for {expected}")]
    UnexpectedResponse { expected: u64, got: u64 },
    /// The peer closed the connection before answering.
    #[error("connection closed by peer")]
    Closed,
}

impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> Self {
        RpcError::Codec(err.to_string())
    }
}
