//! Walks one session through its whole life against the in-memory store:
//! login → authenticate → renew → logout → stale token.
//!
//! Reads `TESSERA_CONFIG_PATH` if set; otherwise runs with a freshly
//! generated key and the default policy. A background task sweeps expired
//! sessions out of the store the way a long-running host would.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use tessera::prelude::*;
use tessera::{CONFIG_PATH_ENV, SessionServiceBuilder};

fn builder() -> Result<SessionServiceBuilder, TesseraError> {
    if std::env::var_os(CONFIG_PATH_ENV).is_some() {
        let config = TesseraConfig::from_env()?;
        tracing::info!(?config, "loaded configuration");
        return Ok(SessionServiceBuilder::from_config(&config)?);
    }

    let key = SecretKey::generate();
    tracing::info!(key = %key.to_hex(), "no config given, generated a throwaway key");
    Ok(SessionServiceBuilder::new().secret_key(key))
}

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Periodically drops expired sessions; lookups already reject them, this
/// only reclaims memory.
fn spawn_sweeper(service: Arc<SessionService<InMemorySessionRepository>>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let purged = service.repository().purge_expired(Utc::now()).await;
            tracing::debug!(count = purged.len(), "expired session sweep done");
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tessera::init_tracing();

    let service = Arc::new(builder()?.build(InMemorySessionRepository::new())?);
    spawn_sweeper(Arc::clone(&service));

    let issued = service.login(AccountId(1)).await?;
    println!("login:    {}", serde_json::to_string_pretty(&issued)?);

    let header = format!("Bearer {}", issued.token);
    let auth = service.authenticate(Some(&header));
    let session = service.get(&auth, &issued.session.id).await?;
    println!("get:      session {} for account {}", session.id, session.account_id);

    let renewed = service.renew(&auth, &session.id, TimeDelta::hours(1)).await?;
    println!("renew:    expires at {}", renewed.session.expires_at);
    println!("          new token {}", renewed.token);

    let middleware = service.extractor();
    println!("extract:  {}", middleware.extract(&issued.token)?);

    service.logout(&auth, &session.id).await?;
    match service.get(&auth, &session.id).await {
        Err(TesseraError::NotFound) => println!("logout:   old token verifies but session is gone"),
        other => println!("logout:   unexpected {other:?}"),
    }

    Ok(())
}
