//! Transaction proof: a native token transfer from the account whose memo
//! carries the challenge.

use std::sync::Arc;

use tracing::{debug, warn};

use shellbook_ledger::LedgerClient;
use shellbook_types::ChainAccount;

pub const DEFAULT_NATIVE_TOKEN_CONTRACT: &str = "eosio.token";
const TRANSFER_ACTION: &str = "transfer";

/// Transaction ids are 32-byte hashes rendered as 64 hex characters.
pub fn is_valid_tx_id(tx_id: &str) -> bool {
    tx_id.len() == 64 && tx_id.bytes().all(|b| b.is_ascii_hexdigit())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionCheck {
    pub valid: bool,
    pub block_num: Option<u64>,
    pub reason: Option<String>,
}

impl TransactionCheck {
    fn accepted(block_num: u64) -> Self {
        Self {
            valid: true,
            block_num: Some(block_num),
            reason: None,
        }
    }

    fn rejected(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            block_num: None,
            reason: Some(reason.into()),
        }
    }
}

pub struct TransactionVerifier {
    ledger: Arc<dyn LedgerClient>,
    native_contract: String,
}

impl TransactionVerifier {
    pub fn new(ledger: Arc<dyn LedgerClient>, native_contract: impl Into<String>) -> Self {
        Self {
            ledger,
            native_contract: native_contract.into(),
        }
    }

    pub async fn verify(&self, tx_id: &str, account: &ChainAccount, challenge: &str) -> TransactionCheck {
        let tx = match self.ledger.get_transaction(tx_id).await {
            Ok(Some(tx)) => tx,
            Ok(None) => return TransactionCheck::rejected(format!("Transaction {tx_id} not found")),
            Err(e) => {
                warn!(tx_id, error = %e, "transaction lookup failed");
                return TransactionCheck::rejected("Could not reach the XPR history indexer");
            }
        };

        let mut saw_transfer = false;
        for trace in &tx.actions {
            let act = &trace.act;
            if act.account != self.native_contract || act.name != TRANSFER_ACTION {
                continue;
            }
            let Some(transfer) = act.transfer_data() else {
                continue;
            };
            if transfer.from != account.as_str() {
                continue;
            }
            saw_transfer = true;
            if transfer.memo.contains(challenge) {
                debug!(tx_id, account = %account, block_num = trace.block_num, "memo proof found");
                return TransactionCheck::accepted(trace.block_num);
            }
        }

        if saw_transfer {
            TransactionCheck::rejected("Transfer memo does not contain the challenge")
        } else {
            TransactionCheck::rejected(format!(
                "Transaction has no {} transfer from @{account}",
                self.native_contract
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shellbook_ledger::{Action, ActionTrace, ChainTransaction};
    use shellbook_nullables::NullLedger;

    const CHALLENGE: &str = "shellbook-verify:abc123";

    fn tx_id() -> String {
        "0f".repeat(32)
    }

    fn transfer(contract: &str, from: &str, memo: &str, block_num: u64) -> ActionTrace {
        ActionTrace {
            block_num,
            act: Action {
                account: contract.into(),
                name: "transfer".into(),
                data: json!({"from": from, "to": "shellbook", "quantity": "1.0000 XPR", "memo": memo}),
            },
        }
    }

    fn verifier_with(actions: Vec<ActionTrace>) -> TransactionVerifier {
        let ledger = NullLedger::new();
        ledger.add_transaction(ChainTransaction { id: tx_id(), actions });
        TransactionVerifier::new(Arc::new(ledger), DEFAULT_NATIVE_TOKEN_CONTRACT)
    }

    fn alicex() -> ChainAccount {
        ChainAccount::parse("alicex").unwrap()
    }

    #[test]
    fn tx_id_format() {
        assert!(is_valid_tx_id(&"aB".repeat(32)));
        assert!(!is_valid_tx_id(&"ab".repeat(31)));
        assert!(!is_valid_tx_id(&"zz".repeat(32)));
    }

    #[tokio::test]
    async fn memo_containing_challenge_is_accepted() {
        let memo = format!("proof {CHALLENGE} thanks");
        let verifier = verifier_with(vec![
            transfer("other.token", "alicex", CHALLENGE, 1),
            transfer("eosio.token", "alicex", &memo, 12_345_678),
        ]);
        let check = verifier.verify(&tx_id(), &alicex(), CHALLENGE).await;
        assert_eq!(check, TransactionCheck::accepted(12_345_678));
    }

    #[tokio::test]
    async fn wrong_sender_or_memo_is_rejected() {
        let verifier = verifier_with(vec![transfer("eosio.token", "bobx", CHALLENGE, 5)]);
        let check = verifier.verify(&tx_id(), &alicex(), CHALLENGE).await;
        assert!(!check.valid);
        assert!(check.reason.unwrap().contains("no eosio.token transfer"));

        let verifier = verifier_with(vec![transfer("eosio.token", "alicex", "hello", 5)]);
        let check = verifier.verify(&tx_id(), &alicex(), CHALLENGE).await;
        assert_eq!(
            check.reason.as_deref(),
            Some("Transfer memo does not contain the challenge")
        );
    }

    #[tokio::test]
    async fn configured_contract_is_honoured() {
        let ledger = NullLedger::new();
        ledger.add_transaction(ChainTransaction {
            id: tx_id(),
            actions: vec![transfer("xtokens", "alicex", CHALLENGE, 9)],
        });
        let verifier = TransactionVerifier::new(Arc::new(ledger), "xtokens");
        assert!(verifier.verify(&tx_id(), &alicex(), CHALLENGE).await.valid);
    }

    #[tokio::test]
    async fn missing_transaction_and_unreachable_indexer_are_rejected() {
        let ledger = Arc::new(NullLedger::new());
        let verifier = TransactionVerifier::new(ledger.clone(), DEFAULT_NATIVE_TOKEN_CONTRACT);
        let check = verifier.verify(&tx_id(), &alicex(), CHALLENGE).await;
        assert!(check.reason.unwrap().contains("not found"));

        ledger.set_unreachable(true);
        let check = verifier.verify(&tx_id(), &alicex(), CHALLENGE).await;
        assert!(!check.valid);
        assert!(check.reason.unwrap().contains("indexer"));
    }
}
