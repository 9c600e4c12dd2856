use std::net::SocketAddr;
use std::process::{Command, Output};

use common_rpc::RpcError;
use rpc_demo::{bind_server, run_client, RpcDemoConfig};
use tokio::net::TcpListener;

async fn start_demo_server() -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let server = bind_server(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("bind");
    let addr = server.local_addr().expect("local addr");
    let handle = tokio::spawn(async move {
        server.serve().await.expect("serve");
    });
    (addr, handle)
}

fn config_for(addr: SocketAddr, dividend: i64, divisor: i64) -> RpcDemoConfig {
    RpcDemoConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        dividend,
        divisor,
        ..RpcDemoConfig::default()
    }
}

/// Port with nothing listening on it.
async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    port
}

fn run_client_binary(port: u16, divisor: i64) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rpc-demo-client"))
        .env_remove("RPC_DEMO_CONFIG")
        .env("RPC_DEMO_HOST", "127.0.0.1")
        .env("RPC_DEMO_PORT", port.to_string())
        .env("RPC_DEMO_DIVIDEND", "3")
        .env("RPC_DEMO_DIVISOR", divisor.to_string())
        .output()
        .expect("spawn client binary")
}

#[tokio::test]
async fn div_three_by_two() {
    let (addr, server) = start_demo_server().await;

    let mut out = Vec::new();
    run_client(&config_for(addr, 3, 2), &mut out)
        .await
        .expect("run client");
    assert_eq!(String::from_utf8(out).expect("utf8"), "1.5 <nil>\n");

    server.abort();
}

#[tokio::test]
async fn div_by_zero_reports_remote_error() {
    let (addr, server) = start_demo_server().await;

    let mut out = Vec::new();
    run_client(&config_for(addr, 3, 0), &mut out)
        .await
        .expect("remote failures are not fatal");
    assert_eq!(String::from_utf8(out).expect("utf8"), "0 division by zero\n");

    server.abort();
}

#[tokio::test]
async fn missing_server_is_fatal() {
    let port = closed_port().await;
    let config = RpcDemoConfig {
        host: "127.0.0.1".to_string(),
        port,
        ..RpcDemoConfig::default()
    };

    let mut out = Vec::new();
    let err = run_client(&config, &mut out).await.unwrap_err();
    assert!(matches!(err, RpcError::Connect { .. }));
    assert!(out.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn binary_prints_result() {
    let (addr, server) = start_demo_server().await;
    let port = addr.port();

    let output = tokio::task::spawn_blocking(move || run_client_binary(port, 2))
        .await
        .expect("join");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "1.5 <nil>\n");

    let output = tokio::task::spawn_blocking(move || run_client_binary(port, 0))
        .await
        .expect("join");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "0 division by zero\n");

    server.abort();
}

#[tokio::test]
async fn binary_exits_non_zero_without_server() {
    let port = closed_port().await;

    let output = tokio::task::spawn_blocking(move || run_client_binary(port, 2))
        .await
        .expect("join");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(!output.stderr.is_empty());
}
