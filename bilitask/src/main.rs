use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use bilitask_core::{
    client::BilibiliClient,
    config::{load_config, Config},
    credential::Credential,
    error::Error,
    logging,
    pairing::{self, ConsolePrompt, PairingOptions},
    runner::TaskRunner,
};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = load_config()?;

    // 2. Initialize logging
    logging::init_logging(&config.logging)?;
    info!("bilitask starting...");

    // 3. Resolve a session credential (env -> file -> pairing)
    let credential = resolve_credential(&config).await?;

    // 4. Verify and run the daily task sequence
    let runner = TaskRunner::new(&config, credential)?;
    let outcome = runner.run().await?;

    // 5. Emit the report; individual task failures are not fatal
    print!("{}", outcome.report);

    Ok(())
}

async fn resolve_credential(config: &Config) -> Result<Credential> {
    if let Some(credential) = Credential::from_env(&config.credential.env_var) {
        info!("using credential from ${}", config.credential.env_var);
        return Ok(credential);
    }

    let cookie_file = Path::new(&config.credential.cookie_file);
    if cookie_file.exists() {
        match Credential::from_file(cookie_file) {
            Ok(credential) => {
                info!("using credential from {}", cookie_file.display());
                return Ok(credential);
            }
            Err(e) => warn!("{e}"),
        }
    }

    if !config.credential.allow_pairing {
        return Err(Error::Configuration(format!(
            "no usable credential: set ${} or provide {}",
            config.credential.env_var, config.credential.cookie_file
        ))
        .into());
    }

    info!("no credential found, starting interactive pairing");
    let client = BilibiliClient::new(config.endpoints.clone())?;
    let options = PairingOptions::from(&config.credential);
    let credential = pairing::pair(&client, &ConsolePrompt, &options).await?;
    info!("pairing succeeded");
    Ok(credential)
}
