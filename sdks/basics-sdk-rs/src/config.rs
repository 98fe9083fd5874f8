//! Ledger connection settings, read from the environment.

use std::str::FromStr;

use anyhow::Context as _;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};

/// Default endpoint of a local `solana-test-validator`
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8899";

/// Where the ledger lives and which program deployments to talk to.
#[derive(Clone, Debug)]
pub struct LedgerConfig {
    pub rpc_url: String,
    pub commitment: CommitmentConfig,
    pub basics_program_id: Pubkey,
    pub staking_program_id: Pubkey,
    pub amm_program_id: Pubkey,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            commitment: CommitmentConfig::confirmed(),
            basics_program_id: basics::id(),
            staking_program_id: staking::id(),
            amm_program_id: amm::id(),
        }
    }
}

impl LedgerConfig {
    /// Build a config from `BASICS_RPC_URL`, `BASICS_PROGRAM_ID`,
    /// `STAKING_PROGRAM_ID` and `AMM_PROGRAM_ID`, loading a `.env` file first if one exists.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup; unset variables fall
    /// back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let program_id = |key: &str, default: Pubkey| -> anyhow::Result<Pubkey> {
            match lookup(key) {
                Some(value) => {
                    Pubkey::from_str(value.trim()).with_context(|| format!("invalid {key}"))
                }
                None => Ok(default),
            }
        };

        Ok(Self {
            rpc_url: lookup("BASICS_RPC_URL").unwrap_or(defaults.rpc_url),
            commitment: defaults.commitment,
            basics_program_id: program_id("BASICS_PROGRAM_ID", defaults.basics_program_id)?,
            staking_program_id: program_id("STAKING_PROGRAM_ID", defaults.staking_program_id)?,
            amm_program_id: program_id("AMM_PROGRAM_ID", defaults.amm_program_id)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn unset_variables_use_defaults() {
        let config = LedgerConfig::from_lookup(|_| None).unwrap();

        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(config.basics_program_id, basics::id());
        assert_eq!(config.staking_program_id, staking::id());
        assert_eq!(config.amm_program_id, amm::id());
        assert_eq!(config.commitment, CommitmentConfig::confirmed());
    }

    #[test]
    fn variables_override_defaults() {
        let program = Pubkey::new_unique();
        let vars = HashMap::from([
            ("BASICS_RPC_URL", "http://validator:8899".to_string()),
            ("BASICS_PROGRAM_ID", program.to_string()),
        ]);
        let config = LedgerConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.rpc_url, "http://validator:8899");
        assert_eq!(config.basics_program_id, program);
        assert_eq!(config.staking_program_id, staking::id());
    }

    #[test]
    fn malformed_program_id_names_the_variable() {
        let err = LedgerConfig::from_lookup(|k| {
            (k == "STAKING_PROGRAM_ID").then(|| "not-a-pubkey".to_string())
        })
        .unwrap_err();

        assert!(format!("{err:#}").contains("STAKING_PROGRAM_ID"));
    }
}
