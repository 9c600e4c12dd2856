//! Arithmetic demo service used by the `rpc-demo` binaries and tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{RpcService, ServiceError};

pub const SERVICE_NAME: &str = "DemoService";
pub const DIV_METHOD: &str = "DemoService.Div";

/// Operands of a division, sent as `{"A": dividend, "B": divisor}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivArgs {
    #[serde(rename = "A")]
    pub a: i64,
    #[serde(rename = "B")]
    pub b: i64,
}

impl DivArgs {
    pub fn new(a: i64, b: i64) -> Self {
        Self { a, b }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DemoService;

impl DemoService {
    pub fn div(&self, args: DivArgs) -> Result<f64, ServiceError> {
        if args.b == 0 {
            return Err(ServiceError::Failed("division by zero".to_string()));
        }
        Ok(args.a as f64 / args.b as f64)
    }
}

#[async_trait]
impl RpcService for DemoService {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, ServiceError> {
        match method {
            "Div" => {
                let args: DivArgs = serde_json::from_value(params)
                    .map_err(|err| ServiceError::InvalidParams(err.to_string()))?;
                Ok(Value::from(self.div(args)?))
            }
            _ => Err(ServiceError::UnknownMethod),
        }
    }
}
