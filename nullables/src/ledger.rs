//! Nullable ledger: canned accounts and transactions.

use async_trait::async_trait;
use shellbook_ledger::{
    AccountAuthority, Authority, ChainTransaction, KeyWeight, LedgerClient, LedgerError, Permission,
};
use shellbook_types::ChainAccount;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// An in-memory [`LedgerClient`].
///
/// Unknown accounts and transactions read as absent. `set_unreachable(true)`
/// makes every call fail as if the endpoint were down.
pub struct NullLedger {
    accounts: Mutex<HashMap<String, AccountAuthority>>,
    transactions: Mutex<HashMap<String, ChainTransaction>>,
    unreachable: AtomicBool,
}

impl NullLedger {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            transactions: Mutex::new(HashMap::new()),
            unreachable: AtomicBool::new(false),
        }
    }

    /// Install `account` with `(permission, key text)` pairs, grouped by permission.
    pub fn add_account(&self, account: &ChainAccount, keys: &[(&str, String)]) {
        let mut permissions: Vec<Permission> = Vec::new();
        for (perm_name, key) in keys {
            let weight = KeyWeight {
                key: key.clone(),
                weight: 1,
            };
            match permissions.iter_mut().find(|p| p.perm_name == *perm_name) {
                Some(perm) => perm.required_auth.keys.push(weight),
                None => permissions.push(Permission {
                    perm_name: perm_name.to_string(),
                    parent: String::new(),
                    required_auth: Authority {
                        threshold: 1,
                        keys: vec![weight],
                    },
                }),
            }
        }
        self.accounts.lock().unwrap().insert(
            account.to_string(),
            AccountAuthority {
                account_name: account.to_string(),
                permissions,
            },
        );
    }

    pub fn add_transaction(&self, tx: ChainTransaction) {
        self.transactions.lock().unwrap().insert(tx.id.clone(), tx);
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    fn check_reachable(&self) -> Result<(), LedgerError> {
        if self.unreachable.load(Ordering::SeqCst) {
            Err(LedgerError::Unreachable("null ledger offline".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerClient for NullLedger {
    async fn get_account(
        &self,
        account: &ChainAccount,
    ) -> Result<Option<AccountAuthority>, LedgerError> {
        self.check_reachable()?;
        Ok(self.accounts.lock().unwrap().get(account.as_str()).cloned())
    }

    async fn get_transaction(&self, tx_id: &str) -> Result<Option<ChainTransaction>, LedgerError> {
        self.check_reachable()?;
        Ok(self.transactions.lock().unwrap().get(tx_id).cloned())
    }
}
