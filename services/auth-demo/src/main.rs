//! Run the placeholder authenticator over the URLs given on the command line.
//!
//! Each URL produces the printed request descriptor followed by the verdict.
//! When a `token_time=<epoch>` argument precedes the URLs, the expiry of a
//! token stamped at that time is reported too, using the `AUTH_TOKEN_*`
//! policy settings.

use std::sync::Arc;

use common_auth::{
    ApiAuthenticator, AuthToken, DefaultApiAuthenticator, ExpiryPolicy, MemoryCredentialStorage,
    SystemClock,
};
use common_config::load;
use common_obs::ObsInit;

const SERVICE_NAME: &str = "auth-demo";
const TOKEN_TIME_ARG: &str = "token_time=";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    ObsInit::init(SERVICE_NAME).map_err(|err| -> Box<dyn std::error::Error> { Box::new(err) })?;

    let policy = load::<ExpiryPolicy>()?;
    let authenticator = DefaultApiAuthenticator::new(Arc::new(MemoryCredentialStorage::new()));

    let mut token_time = None;
    for arg in std::env::args().skip(1) {
        if let Some(value) = arg.strip_prefix(TOKEN_TIME_ARG) {
            token_time = Some(value.parse::<i64>()?);
            continue;
        }

        let accepted = authenticator.auth(&arg);
        println!(" accepted={accepted}");

        if let Some(create_time) = token_time {
            let token = AuthToken::new(create_time, "", arg.as_str());
            let expired = token.is_expired(&policy, &SystemClock);
            tracing::info!(url = %arg, create_time, mode = ?policy.mode, expired, "token expiry evaluated");
            println!("token expired={expired}");
        }
    }

    Ok(())
}
