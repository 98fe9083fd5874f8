//! Access to a running ledger.
//!
//! [`Ledger`] is the small surface the scenario and the CLI need from a
//! cluster: faucet airdrops, signature confirmation, transaction submission
//! and account reads. [`RpcLedger`] implements it over JSON-RPC; test harnesses
//! provide in-process implementations.

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    hash::Hash,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    transaction::Transaction,
};
use tracing::debug;

use crate::config::LedgerConfig;

#[async_trait]
pub trait Ledger: Send + Sync {
    /// Ask the faucet for `lamports`; returns as soon as the request is
    /// accepted, before the transfer is confirmed.
    async fn request_airdrop(&self, to: &Pubkey, lamports: u64) -> anyhow::Result<Signature>;

    /// Block until `signature` reaches the ledger's commitment level; fails if
    /// the transaction itself failed.
    async fn confirm_transaction(&self, signature: &Signature) -> anyhow::Result<()>;

    async fn latest_blockhash(&self) -> anyhow::Result<Hash>;

    async fn send_and_confirm_transaction(
        &self,
        transaction: &Transaction,
    ) -> anyhow::Result<Signature>;

    async fn get_account(&self, address: &Pubkey) -> anyhow::Result<Option<Account>>;

    async fn get_balance(&self, address: &Pubkey) -> anyhow::Result<u64>;

    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> anyhow::Result<u64>;

    /// Sign `instructions` with `payer` plus `signers` against a fresh
    /// blockhash, submit, and wait for confirmation.
    async fn send_instructions(
        &self,
        instructions: &[Instruction],
        payer: &Keypair,
        signers: &[&Keypair],
    ) -> anyhow::Result<Signature> {
        use solana_sdk::signer::Signer as _;

        let blockhash = self.latest_blockhash().await?;
        let mut keypairs: Vec<&Keypair> = Vec::with_capacity(signers.len() + 1);
        keypairs.push(payer);
        keypairs.extend_from_slice(signers);

        let mut transaction = Transaction::new_with_payer(instructions, Some(&payer.pubkey()));
        transaction.try_sign(&keypairs[..], blockhash)?;
        self.send_and_confirm_transaction(&transaction).await
    }
}

/// [`Ledger`] backed by a cluster's JSON-RPC endpoint.
pub struct RpcLedger {
    client: RpcClient,
}

impl RpcLedger {
    pub fn new(rpc_url: impl Into<String>, commitment: CommitmentConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(rpc_url.into(), commitment),
        }
    }

    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(config.rpc_url.clone(), config.commitment)
    }

    /// The underlying RPC client, for calls the [`Ledger`] trait does not cover.
    pub fn client(&self) -> &RpcClient {
        &self.client
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn request_airdrop(&self, to: &Pubkey, lamports: u64) -> anyhow::Result<Signature> {
        let signature = self.client.request_airdrop(to, lamports).await?;
        debug!(%to, lamports, %signature, "airdrop requested");
        Ok(signature)
    }

    async fn confirm_transaction(&self, signature: &Signature) -> anyhow::Result<()> {
        self.client
            .poll_for_signature_with_commitment(signature, self.client.commitment())
            .await?;
        if let Some(Err(err)) = self.client.get_signature_status(signature).await? {
            anyhow::bail!("transaction {signature} failed: {err}");
        }
        debug!(%signature, "confirmed");
        Ok(())
    }

    async fn latest_blockhash(&self) -> anyhow::Result<Hash> {
        Ok(self.client.get_latest_blockhash().await?)
    }

    async fn send_and_confirm_transaction(
        &self,
        transaction: &Transaction,
    ) -> anyhow::Result<Signature> {
        let signature = self.client.send_and_confirm_transaction(transaction).await?;
        debug!(%signature, "transaction confirmed");
        Ok(signature)
    }

    async fn get_account(&self, address: &Pubkey) -> anyhow::Result<Option<Account>> {
        let response = self
            .client
            .get_account_with_commitment(address, self.client.commitment())
            .await?;
        Ok(response.value)
    }

    async fn get_balance(&self, address: &Pubkey) -> anyhow::Result<u64> {
        Ok(self.client.get_balance(address).await?)
    }

    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> anyhow::Result<u64> {
        Ok(self
            .client
            .get_minimum_balance_for_rent_exemption(data_len)
            .await?)
    }
}
