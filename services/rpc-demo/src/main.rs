use std::io;

use common_config::load;
use common_obs::ObsInit;
use rpc_demo::{run_client, RpcDemoConfig, CLIENT_SERVICE_NAME};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ObsInit::init(CLIENT_SERVICE_NAME)
        .map_err(|err| -> Box<dyn std::error::Error> { Box::new(err) })?;

    let config = load::<RpcDemoConfig>()?;
    tracing::info!(
        event = "client_start",
        service = CLIENT_SERVICE_NAME,
        version = VERSION,
        endpoint = %config.endpoint(),
        method = %config.method,
        "starting rpc demo call"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_client(&config, &mut out).await.inspect_err(|err| {
        tracing::error!(event = "client_abort", error = %err, "rpc demo failed");
    })?;

    Ok(())
}
