use common_config::{env_override, ServiceConfig};
use common_rpc::demo::DIV_METHOD;
use serde::Deserialize;

/// Settings for the demo client: where to dial and what to ask.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RpcDemoConfig {
    pub host: String,
    pub port: u16,
    pub method: String,
    pub dividend: i64,
    pub divisor: i64,
}

impl Default for RpcDemoConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1234,
            method: DIV_METHOD.to_string(),
            dividend: 3,
            divisor: 2,
        }
    }
}

impl RpcDemoConfig {
    /// `host:port` as accepted by the resolver.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ServiceConfig for RpcDemoConfig {
    const PREFIX: &'static str = "RPC_DEMO_";

    fn apply_environment_overrides(&mut self, prefix: &str) {
        env_override(prefix, "HOST", &mut self.host);
        env_override(prefix, "PORT", &mut self.port);
        env_override(prefix, "METHOD", &mut self.method);
        env_override(prefix, "DIVIDEND", &mut self.dividend);
        env_override(prefix, "DIVISOR", &mut self.divisor);
    }
}
