use std::net::SocketAddr;

use common_config::service_port;
use common_obs::ObsInit;
use rpc_demo::{bind_server, DEFAULT_SERVER_PORT, SERVER_PORT_ENV, SERVER_SERVICE_NAME};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ObsInit::init(SERVER_SERVICE_NAME)
        .map_err(|err| -> Box<dyn std::error::Error> { Box::new(err) })?;

    let port = service_port(SERVER_PORT_ENV, DEFAULT_SERVER_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(
        event = "service_start",
        service = SERVER_SERVICE_NAME,
        version = VERSION,
        listen_addr = %addr,
        "starting service"
    );

    let server = bind_server(addr).await?;
    server.serve().await?;

    tracing::info!(event = "service_stop", service = SERVER_SERVICE_NAME);
    Ok(())
}
