//! Wire types for the subset of chain RPC and indexer responses we read.
//!
//! Unknown fields are ignored; everything we do not need is left out.

use serde::{Deserialize, Serialize};

/// `get_account` response, trimmed to its permission tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAuthority {
    pub account_name: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl AccountAuthority {
    /// Every `(permission name, key text)` pair on the account.
    pub fn keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.permissions.iter().flat_map(|perm| {
            perm.required_auth
                .keys
                .iter()
                .map(move |k| (perm.perm_name.as_str(), k.key.as_str()))
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub perm_name: String,
    #[serde(default)]
    pub parent: String,
    pub required_auth: Authority,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    #[serde(default)]
    pub threshold: u32,
    #[serde(default)]
    pub keys: Vec<KeyWeight>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyWeight {
    pub key: String,
    #[serde(default)]
    pub weight: u32,
}

/// Indexer `get_transaction` response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainTransaction {
    #[serde(default, alias = "trx_id")]
    pub id: String,
    #[serde(default)]
    pub actions: Vec<ActionTrace>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionTrace {
    #[serde(default)]
    pub block_num: u64,
    pub act: Action,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub account: String,
    pub name: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Payload of a token `transfer` action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferData {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub memo: String,
}

impl Action {
    /// Decode `data` as a transfer payload. `None` when the shape does not fit.
    pub fn transfer_data(&self) -> Option<TransferData> {
        serde_json::from_value(self.data.clone()).ok()
    }
}
