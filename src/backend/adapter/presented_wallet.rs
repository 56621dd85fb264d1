// src/backend/adapter/presented_wallet.rs
use crate::error::VaultError;
use crate::models::session::WalletAccount;
use crate::services::ports::WalletProvider;
use crate::utils::format::is_aleo_address;

/// What the browser wallet handed the frontend: the account it exposed and,
/// if the user agreed, a signature over the auth message. The signature is
/// carried, not verified.
pub struct PresentedWallet {
    pub address: String,
    pub network: String,
    pub signature: Option<String>,
}

impl WalletProvider for PresentedWallet {
    async fn connect(&self) -> Result<WalletAccount, VaultError> {
        if !is_aleo_address(&self.address) {
            return Err(VaultError::InvalidInput(format!(
                "Not an Aleo address: {}",
                self.address
            )));
        }
        Ok(WalletAccount {
            address: self.address.clone(),
            network: self.network.clone(),
        })
    }

    async fn sign_message(&self, _message: &str) -> Result<String, VaultError> {
        self.signature
            .clone()
            .filter(|sig| !sig.trim().is_empty())
            .ok_or_else(|| VaultError::WalletRejected("Signature request declined".to_string()))
    }

    fn is_available(&self) -> bool {
        !self.address.is_empty()
    }
}
