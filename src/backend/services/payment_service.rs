// src/backend/services/payment_service.rs
use crate::adapter::aleo_program::SubscribeCall;
use crate::error::VaultError;
use crate::metrics;
use crate::models::common::{SubscriptionTier, TimestampMs, WireTag};
use crate::models::config::AppConfig;
use crate::models::session::WalletSession;
use crate::models::subscription::{CheckoutSession, Subscription};
use crate::services::ports::{ChainGateway, CheckoutSpec, PaymentProvider, PriceSpec};
use crate::storage;
use crate::utils::format::format_address;

// Pro Explorer plan
const PRO_PRICE_CENTS: u64 = 999;
const PRO_CURRENCY: &str = "usd";
const PRO_INTERVAL: &str = "month";
const PRO_PRODUCT_NAME: &str = "Pro Explorer";
const PRO_PLAN_KEY: &str = "pro_explorer";

pub fn pro_price_spec() -> PriceSpec {
    PriceSpec {
        unit_amount: PRO_PRICE_CENTS,
        currency: PRO_CURRENCY.to_string(),
        interval: PRO_INTERVAL.to_string(),
        product_name: PRO_PRODUCT_NAME.to_string(),
    }
}

pub fn pro_checkout_spec(price_id: String, origin: &str) -> CheckoutSpec {
    let origin = origin.trim_end_matches('/');
    CheckoutSpec {
        price_id,
        quantity: 1,
        success_url: format!("{}/subscription/success?session_id={{CHECKOUT_SESSION_ID}}", origin),
        cancel_url: format!("{}/subscription", origin),
        metadata: vec![
            ("tier".to_string(), SubscriptionTier::Pro.tag().to_string()),
            ("plan".to_string(), PRO_PLAN_KEY.to_string()),
        ],
    }
}

async fn checkout_flow<P: PaymentProvider>(provider: &P, origin: &str) -> Result<CheckoutSession, VaultError> {
    let price_id = provider.create_price(&pro_price_spec()).await?;
    provider
        .create_checkout_session(&pro_checkout_spec(price_id, origin))
        .await
}

/// Creates the monthly Pro price and a subscription checkout session for it.
///
/// # Arguments
/// * `origin` - Frontend origin the payment page returns to.
pub async fn create_checkout<P: PaymentProvider>(provider: &P, origin: &str) -> Result<CheckoutSession, VaultError> {
    match checkout_flow(provider, origin).await {
        Ok(session) => {
            metrics::record_checkout();
            log_info!("Checkout session {} created", session.id);
            Ok(session)
        }
        Err(e) => {
            metrics::record_upstream_failure();
            log_error!("Checkout error: {}", e);
            Err(e)
        }
    }
}

/// Registers a Pro subscription on-chain and records it for 30 days.
pub async fn activate_subscription<C: ChainGateway>(
    chain: &C,
    config: &AppConfig,
    session: &WalletSession,
    now: TimestampMs,
) -> Result<Subscription, VaultError> {
    let address = session
        .address()
        .map(str::to_string)
        .ok_or(VaultError::WalletNotConnected)?;

    let call = SubscribeCall {
        tier: SubscriptionTier::Pro,
        now_ms: now,
    }
    .build(&config.subscription_program_id);
    let tx_id = chain.execute(&address, &call).await?;

    let current = storage::subscriptions::get_subscription(&address);
    let subscription = Subscription::pro(now, tx_id, current.vaults_used);
    storage::subscriptions::put_subscription(&address, subscription.clone());
    metrics::record_subscription_activated();
    log_info!("Pro subscription activated for {}", format_address(&address));
    Ok(subscription)
}

pub fn get_subscription(session: &WalletSession, now: TimestampMs) -> Result<Subscription, VaultError> {
    let address = session
        .address()
        .map(str::to_string)
        .ok_or(VaultError::WalletNotConnected)?;
    Ok(storage::subscriptions::get_subscription(&address).as_of(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::aleo_program::SUBSCRIBE_FN;
    use crate::models::session::WalletAccount;
    use crate::models::subscription::SUBSCRIPTION_PERIOD_MS;
    use crate::services::vault_service::fakes::FakeChain;
    use futures::executor::block_on;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakePayments {
        prices: RefCell<Vec<PriceSpec>>,
        checkouts: RefCell<Vec<CheckoutSpec>>,
        fail: bool,
    }

    impl PaymentProvider for FakePayments {
        async fn create_price(&self, spec: &PriceSpec) -> Result<String, VaultError> {
            if self.fail {
                return Err(VaultError::UpstreamRejected { status: 401, details: "invalid key".into() });
            }
            self.prices.borrow_mut().push(spec.clone());
            Ok("price_123".into())
        }

        async fn create_checkout_session(&self, spec: &CheckoutSpec) -> Result<CheckoutSession, VaultError> {
            self.checkouts.borrow_mut().push(spec.clone());
            Ok(CheckoutSession { id: "cs_1".into(), url: "https://checkout.stripe.com/c/cs_1".into() })
        }
    }

    fn session() -> WalletSession {
        WalletSession::disconnected().connected_unverified(WalletAccount {
            address: "aleo1payer".into(),
            network: "testnet".into(),
        })
    }

    #[test]
    fn checkout_uses_pro_plan() {
        let payments = FakePayments::default();
        let session = block_on(create_checkout(&payments, "https://timevault.app/")).unwrap();
        assert_eq!(session.url, "https://checkout.stripe.com/c/cs_1");

        assert_eq!(payments.prices.borrow()[0], pro_price_spec());
        let spec = payments.checkouts.borrow()[0].clone();
        assert_eq!(spec.price_id, "price_123");
        assert_eq!(
            spec.success_url,
            "https://timevault.app/subscription/success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(spec.cancel_url, "https://timevault.app/subscription");
        assert!(spec.metadata.contains(&("tier".to_string(), "1".to_string())));
    }

    #[test]
    fn checkout_failure_propagates() {
        let payments = FakePayments { fail: true, ..Default::default() };
        assert!(block_on(create_checkout(&payments, "http://localhost:3000")).is_err());
        assert!(payments.checkouts.borrow().is_empty());
    }

    #[test]
    fn activation_submits_subscribe_and_records_pro() {
        let chain = FakeChain::default();
        let now = 90_000;
        let sub = block_on(activate_subscription(&chain, &AppConfig::default(), &session(), now)).unwrap();
        assert_eq!(sub.tier, SubscriptionTier::Pro);
        assert_eq!(sub.end_time, now + SUBSCRIPTION_PERIOD_MS);

        let calls = chain.calls.borrow();
        assert_eq!(calls[0].1.function, SUBSCRIBE_FN);
        assert_eq!(calls[0].1.program_id, "timevault_subscription_9483.aleo");
        assert_eq!(calls[0].1.wire_inputs(), vec!["1u8".to_string(), "90u64".to_string()]);

        assert!(get_subscription(&session(), now + SUBSCRIPTION_PERIOD_MS).unwrap().is_active);
        assert!(!get_subscription(&session(), now + SUBSCRIPTION_PERIOD_MS + 1).unwrap().is_active);
    }

    #[test]
    fn activation_requires_session() {
        let chain = FakeChain::default();
        assert_eq!(
            block_on(activate_subscription(&chain, &AppConfig::default(), &WalletSession::disconnected(), 0)),
            Err(VaultError::WalletNotConnected)
        );
    }
}
