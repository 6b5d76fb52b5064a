use async_trait::async_trait;

use shellbook_types::ChainAccount;

use crate::{AccountAuthority, ChainTransaction, LedgerError};

/// Ledger lookups used by proof verification.
///
/// `Ok(None)` means the ledger answered and the object does not exist;
/// transport and decoding failures are errors.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn get_account(
        &self,
        account: &ChainAccount,
    ) -> Result<Option<AccountAuthority>, LedgerError>;

    async fn get_transaction(&self, tx_id: &str) -> Result<Option<ChainTransaction>, LedgerError>;
}
