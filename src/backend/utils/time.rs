use crate::models::common::{TimestampMs, TimestampNs};

const NANOS_PER_MILLI: u64 = 1_000_000;

/// Returns the current time as nanoseconds since epoch. Inside the canister
/// this is the IC system time; natively it falls back to the OS clock.
#[cfg(target_arch = "wasm32")]
pub fn get_current_time_ns() -> TimestampNs {
    ic_cdk::api::time()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn get_current_time_ns() -> TimestampNs {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

pub fn get_current_time_ms() -> TimestampMs {
    get_current_time_ns() / NANOS_PER_MILLI
}

/// Aleo programs take whole seconds.
pub fn ms_to_secs(ms: TimestampMs) -> u64 {
    ms / 1_000
}
