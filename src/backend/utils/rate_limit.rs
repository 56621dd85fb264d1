// src/backend/utils/rate_limit.rs
use crate::error::VaultError;
use crate::models::common::TimestampNs;
use candid::Principal;
use std::cell::RefCell;
use std::collections::HashMap;

// --- Configuration ---
// Outcall-backed routes (AI, pinning) burn cycles; keep bursts small.
const RATE_LIMIT_CAPACITY: u32 = 10;
const RATE_LIMIT_REFILL_RATE_PER_SEC: f64 = 0.2;

// Gateway requests all arrive as the anonymous principal and share one bucket.
const GATEWAY_CAPACITY: u32 = 500;
const GATEWAY_REFILL_RATE_PER_SEC: f64 = 20.0;

#[derive(Clone, Copy, Debug)]
struct Budget {
    capacity: u32,
    refill_per_sec: f64,
}

const PRINCIPAL_BUDGET: Budget = Budget {
    capacity: RATE_LIMIT_CAPACITY,
    refill_per_sec: RATE_LIMIT_REFILL_RATE_PER_SEC,
};

const GATEWAY_BUDGET: Budget = Budget {
    capacity: GATEWAY_CAPACITY,
    refill_per_sec: GATEWAY_REFILL_RATE_PER_SEC,
};

struct TokenBucket {
    budget: Budget,
    tokens: f64,
    last_refill_time_ns: u64,
}

impl TokenBucket {
    fn new(budget: Budget, now_ns: TimestampNs) -> Self {
        TokenBucket {
            budget,
            tokens: budget.capacity as f64,
            last_refill_time_ns: now_ns,
        }
    }

    fn refill(&mut self, now_ns: TimestampNs) {
        let elapsed_secs =
            (now_ns.saturating_sub(self.last_refill_time_ns)) as f64 / 1_000_000_000.0;
        let tokens_to_add = elapsed_secs * self.budget.refill_per_sec;

        self.tokens = (self.tokens + tokens_to_add).min(self.budget.capacity as f64);
        self.last_refill_time_ns = now_ns;
    }

    fn take(&mut self, now_ns: TimestampNs) -> bool {
        self.refill(now_ns);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

thread_local! {
    // In-memory map for rate limiting. Cleared on upgrade.
    static PRINCIPAL_BUCKETS: RefCell<HashMap<Principal, TokenBucket>> = RefCell::new(HashMap::new());
}

/// Takes one token from the caller's bucket. Anonymous callers draw from
/// the shared gateway budget instead of a per-principal one.
pub fn check_rate(caller: Principal, now_ns: TimestampNs) -> Result<(), VaultError> {
    let budget = if caller == Principal::anonymous() {
        GATEWAY_BUDGET
    } else {
        PRINCIPAL_BUDGET
    };
    PRINCIPAL_BUCKETS.with(|buckets_refcell| {
        let mut buckets = buckets_refcell.borrow_mut();
        let bucket = buckets
            .entry(caller)
            .or_insert_with(|| TokenBucket::new(budget, now_ns));

        if bucket.take(now_ns) {
            Ok(())
        } else {
            Err(VaultError::RateLimitExceeded(format!(
                "Rate limit exceeded for principal {}. Please try again later.",
                caller
            )))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_drains_then_refills() {
        let caller = Principal::from_slice(&[1, 2, 3]);
        let t0 = 1_000_000_000u64;
        for _ in 0..RATE_LIMIT_CAPACITY {
            check_rate(caller, t0).unwrap();
        }
        assert!(matches!(check_rate(caller, t0), Err(VaultError::RateLimitExceeded(_))));

        // 5 seconds at 0.2 tokens/s buys one more call.
        check_rate(caller, t0 + 5_000_000_000).unwrap();
        assert!(check_rate(caller, t0 + 5_000_000_000).is_err());
    }

    #[test]
    fn buckets_are_per_caller() {
        let a = Principal::from_slice(&[1]);
        let b = Principal::from_slice(&[2]);
        for _ in 0..RATE_LIMIT_CAPACITY {
            check_rate(a, 0).unwrap();
        }
        assert!(check_rate(a, 0).is_err());
        assert!(check_rate(b, 0).is_ok());
    }

    #[test]
    fn anonymous_gateway_traffic_has_its_own_budget() {
        let anon = Principal::anonymous();
        let t0 = 1_000_000_000u64;
        // One gateway client spends a whole per-principal allowance.
        for _ in 0..RATE_LIMIT_CAPACITY {
            check_rate(anon, t0).unwrap();
        }
        // The next client a second later still gets through.
        check_rate(anon, t0 + 1_000_000_000).unwrap();

        for _ in 0..GATEWAY_CAPACITY {
            let _ = check_rate(anon, t0 + 1_000_000_000);
        }
        assert!(check_rate(anon, t0 + 1_000_000_000).is_err());
    }
}
