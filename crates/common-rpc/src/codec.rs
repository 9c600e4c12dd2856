use std::marker::PhantomData;

use bytes::BytesMut;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};

use crate::RpcError;

/// Longest accepted line, in bytes.
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Request as written by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRequest {
    pub method: String,
    pub params: Value,
    pub id: u64,
}

/// Response as read by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientResponse {
    pub id: u64,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

/// Request as read by the server. The id is echoed back untouched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerRequest {
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(default)]
    pub id: Value,
}

/// Response as written by the server; `result` is null whenever `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerResponse {
    pub id: Value,
    pub result: Value,
    pub error: Value,
}

impl ServerResponse {
    pub fn result(id: Value, result: Value) -> Self {
        Self {
            id,
            result,
            error: Value::Null,
        }
    }

    pub fn error(id: Value, message: impl Into<String>) -> Self {
        Self {
            id,
            result: Value::Null,
            error: Value::String(message.into()),
        }
    }
}

/// Frames one JSON document per line, decoding `D` and encoding `E`.
#[derive(Debug)]
pub struct JsonLineCodec<D, E> {
    inner: LinesCodec,
    _types: PhantomData<fn(E) -> D>,
}

impl<D, E> JsonLineCodec<D, E> {
    pub fn new() -> Self {
        Self {
            inner: LinesCodec::new_with_max_length(MAX_LINE_LENGTH),
            _types: PhantomData,
        }
    }
}

impl<D, E> Default for JsonLineCodec<D, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl From<LinesCodecError> for RpcError {
    fn from(err: LinesCodecError) -> Self {
        match err {
            LinesCodecError::MaxLineLengthExceeded => {
                RpcError::Codec(format!("line longer than {MAX_LINE_LENGTH} bytes"))
            }
            LinesCodecError::Io(err) => RpcError::Io(err),
        }
    }
}

impl<D: DeserializeOwned, E> Decoder for JsonLineCodec<D, E> {
    type Item = D;
    type Error = RpcError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.inner.decode(src)? {
                // Blank lines between frames are tolerated.
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => return Ok(Some(serde_json::from_str(&line)?)),
                None => return Ok(None),
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.inner.decode_eof(src)? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => return Ok(Some(serde_json::from_str(&line)?)),
                None => return Ok(None),
            }
        }
    }
}

impl<D, E: Serialize> Encoder<E> for JsonLineCodec<D, E> {
    type Error = RpcError;

    fn encode(&mut self, item: E, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let line = serde_json::to_string(&item)?;
        self.inner.encode(line, dst)?;
        Ok(())
    }
}
