//! Chain account names on the XPR (EOSIO-family) ledger.
//!
//! Account names are 1-12 characters drawn from `a-z`, `1-5` and `.`.
//! The type can only be constructed through [`ChainAccount::parse`], so every
//! value in the system is known to satisfy the naming grammar.

use crate::TypeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated chain account name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ChainAccount(String);

impl ChainAccount {
    /// Maximum length of an account name.
    pub const MAX_LEN: usize = 12;

    /// Parse and validate an account name.
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        if Self::is_valid(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(TypeError::InvalidAccountName(raw.to_string()))
        }
    }

    /// Whether `raw` matches `^[a-z1-5.]{1,12}$`.
    pub fn is_valid(raw: &str) -> bool {
        !raw.is_empty()
            && raw.len() <= Self::MAX_LEN
            && raw
                .bytes()
                .all(|b| matches!(b, b'a'..=b'z' | b'1'..=b'5' | b'.'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChainAccount {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for ChainAccount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_typical_names() {
        for name in ["alicex", "a", "eosio.token", "bob12345", "abcdefghijkl"] {
            assert!(ChainAccount::parse(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_out_of_grammar_names() {
        for name in ["", "Alice", "alice6", "alice_x", "abcdefghijklm", "al ice", "alice0"] {
            assert_eq!(
                ChainAccount::parse(name),
                Err(TypeError::InvalidAccountName(name.to_string()))
            );
        }
    }

    #[test]
    fn deserialize_validates() {
        let ok: ChainAccount = serde_json::from_str("\"alicex\"").unwrap();
        assert_eq!(ok.as_str(), "alicex");
        assert!(serde_json::from_str::<ChainAccount>("\"ALICE\"").is_err());
    }

    proptest! {
        #[test]
        fn grammar_names_always_parse(name in "[a-z1-5.]{1,12}") {
            let account = ChainAccount::parse(&name).unwrap();
            prop_assert_eq!(account.as_str(), name.as_str());
        }

        #[test]
        fn names_with_foreign_chars_never_parse(
            prefix in "[a-z1-5.]{0,5}",
            bad in "[A-Z06-9_!@ ]",
            suffix in "[a-z1-5.]{0,5}",
        ) {
            let name = format!("{prefix}{bad}{suffix}");
            prop_assert!(ChainAccount::parse(&name).is_err());
        }
    }
}
