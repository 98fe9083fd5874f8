//! End-to-end account initialization flow.
//!
//! Fund a fresh signer from the faucet, create a fresh account through the
//! Basics `Initialize` instruction, read it back and check the stored value.
//! Every step awaits its round-trip before the next one starts; errors from
//! the ledger propagate unchanged.

use solana_sdk::{
    native_token::LAMPORTS_PER_SOL,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
};
use tracing::info;

use crate::{ledger::Ledger, reader::read_new_account, BasicsClient, InitializeParams};

/// Knobs of the flow; the defaults airdrop 1 SOL and store `1`.
#[derive(Clone, Copy, Debug)]
pub struct ScenarioConfig {
    /// Lamports requested per airdrop
    pub airdrop_lamports: u64,
    /// Value passed to `Initialize` and expected back
    pub value: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            airdrop_lamports: LAMPORTS_PER_SOL,
            value: 1,
        }
    }
}

/// What a successful run produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScenarioReport {
    pub signer: Pubkey,
    pub new_account: Pubkey,
    /// Signature of the `Initialize` transaction
    pub signature: Signature,
    /// Value read back from the new account
    pub data: u64,
}

pub struct InitializeScenario<'a, L: ?Sized> {
    ledger: &'a L,
    client: BasicsClient,
    config: ScenarioConfig,
}

impl<'a, L> InitializeScenario<'a, L>
where
    L: Ledger + ?Sized,
{
    pub fn new(ledger: &'a L, program_id: Pubkey) -> Self {
        Self {
            ledger,
            client: BasicsClient::new(program_id),
            config: ScenarioConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ScenarioConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the flow with freshly generated `signer` and `new_account` keypairs.
    pub async fn run(&self) -> anyhow::Result<ScenarioReport> {
        let signer = Keypair::new();
        let new_account = Keypair::new();
        self.run_with(&signer, &new_account).await
    }

    /// Run the flow with caller-provided keypairs.
    pub async fn run_with(
        &self,
        signer: &Keypair,
        new_account: &Keypair,
    ) -> anyhow::Result<ScenarioReport> {
        self.fund(&signer.pubkey()).await?;
        let signature = self.initialize(signer, new_account).await?;
        let data = self.verify(&new_account.pubkey()).await?;

        Ok(ScenarioReport {
            signer: signer.pubkey(),
            new_account: new_account.pubkey(),
            signature,
            data,
        })
    }

    /// Request two airdrops to `signer`, waiting only on the second.
    ///
    /// The first request is fire-and-forget: its signature is dropped and its
    /// transfer may or may not have landed when this returns.
    pub async fn fund(&self, signer: &Pubkey) -> anyhow::Result<Signature> {
        let lamports = self.config.airdrop_lamports;

        self.ledger.request_airdrop(signer, lamports).await?;

        let signature = self.ledger.request_airdrop(signer, lamports).await?;
        self.ledger.confirm_transaction(&signature).await?;
        info!(%signer, lamports, %signature, "airdrop confirmed");
        Ok(signature)
    }

    /// Submit `Initialize(value)` signed by both `signer` and `new_account`.
    ///
    /// `new_account` is a plain keypair rather than a program-derived address,
    /// so its own signature is what authorizes its creation.
    pub async fn initialize(
        &self,
        signer: &Keypair,
        new_account: &Keypair,
    ) -> anyhow::Result<Signature> {
        let ix = self.client.initialize_ix(InitializeParams {
            new_account: new_account.pubkey(),
            signer: signer.pubkey(),
            data: self.config.value,
        });
        let signature = self
            .ledger
            .send_instructions(&[ix], signer, &[new_account])
            .await?;
        info!(%signature, "Your transaction signature");
        Ok(signature)
    }

    /// Read `new_account` back and check it holds the configured value.
    pub async fn verify(&self, new_account: &Pubkey) -> anyhow::Result<u64> {
        let record = read_new_account(self.ledger, &self.client.program_id, new_account).await?;
        let expected = self.config.value;
        anyhow::ensure!(
            record.data == expected,
            "The data in new_account should be {expected}, found {}",
            record.data
        );
        Ok(record.data)
    }
}
