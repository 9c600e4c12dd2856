//! One-shot JSON-RPC demo: dial, call `DemoService.Div`, print, exit.

pub mod config;

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use common_rpc::demo::{DemoService, DivArgs};
use common_rpc::{RpcClient, RpcError, RpcServer};

pub use config::RpcDemoConfig;

pub const CLIENT_SERVICE_NAME: &str = "rpc-demo-client";
pub const SERVER_SERVICE_NAME: &str = "rpc-demo-server";
pub const SERVER_PORT_ENV: &str = "RPC_DEMO_SERVER_PORT";
pub const DEFAULT_SERVER_PORT: u16 = 1234;

/// Render a call outcome as `"<result> <error>"`.
///
/// On failure the result is the zero value and must not be trusted.
pub fn format_outcome(outcome: &Result<f64, RpcError>) -> String {
    match outcome {
        Ok(result) => format!("{} <nil>", format_float(*result)),
        Err(err) => format!("{} {err}", format_float(f64::default())),
    }
}

/// Shortest decimal that round-trips, switching to `d.ddde±XX` when the
/// decimal exponent is below -4 or at least 6.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let sign = if value.is_sign_positive() { '+' } else { '-' };
        return format!("{sign}Inf");
    }

    let scientific = format!("{value:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return value.to_string();
    };
    if (-4..6).contains(&exponent) {
        return value.to_string();
    }

    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
}

/// Connect, make the configured call, and write the outcome line to `out`.
///
/// Only a connection failure is returned as an error; a failed call is
/// reported in the output line like a successful one.
pub async fn run_client<W: Write>(config: &RpcDemoConfig, out: &mut W) -> Result<(), RpcError> {
    let endpoint = config.endpoint();
    let mut client = RpcClient::connect(endpoint.as_str()).await?;

    let args = DivArgs::new(config.dividend, config.divisor);
    let outcome = client.call::<_, f64>(&config.method, args).await;
    match &outcome {
        Ok(result) => tracing::info!(method = %config.method, result, "rpc call succeeded"),
        Err(err) => tracing::warn!(method = %config.method, error = %err, "rpc call failed"),
    }

    writeln!(out, "{}", format_outcome(&outcome))?;
    out.flush()?;

    if let Err(err) = client.close().await {
        tracing::debug!(error = %err, "closing rpc connection failed");
    }
    Ok(())
}

/// Bind the demo server with [`DemoService`] registered.
pub async fn bind_server(addr: SocketAddr) -> Result<RpcServer, RpcError> {
    let mut server = RpcServer::bind(addr).await?;
    server.register(Arc::new(DemoService));
    Ok(server)
}
