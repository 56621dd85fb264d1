// src/backend/services/scheduler.rs
// Background work driven by canister timers.

use crate::adapter::aleo_relay_adapter::AleoRelayGateway;
use crate::error::VaultError;
use crate::services::session_service;
use crate::storage;
use crate::utils::rng;
use crate::utils::time::get_current_time_ms;
use std::time::Duration;

pub const AVAILABILITY_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Arms the one-shot bootstrap and the periodic availability poll.
/// Called from `init` and `post_upgrade`; timers do not survive upgrades.
pub fn start() {
    ic_cdk_timers::set_timer(Duration::ZERO, || {
        ic_cdk::spawn(async {
            if let Err(e) = bootstrap().await {
                log_error!("SCHEDULER: bootstrap failed: {}", e);
            }
            run_availability_poll().await;
        })
    });
    ic_cdk_timers::set_timer_interval(AVAILABILITY_POLL_INTERVAL, || {
        ic_cdk::spawn(run_availability_poll())
    });
    log_info!(
        "SCHEDULER: timers armed, availability poll every {}s",
        AVAILABILITY_POLL_INTERVAL.as_secs()
    );
}

/// Seeds the RNG and makes sure the sealing secret exists.
pub async fn bootstrap() -> Result<(), VaultError> {
    if !rng::is_initialized() {
        rng::initialize_internal_rng().await?;
    }
    storage::config::ensure_master_secret()?;
    Ok(())
}

/// One availability check against the configured chain RPC.
pub async fn run_availability_poll() {
    let gateway = AleoRelayGateway::from_config(&storage::config::get_config());
    session_service::poll_availability(&gateway, get_current_time_ms()).await;
}
