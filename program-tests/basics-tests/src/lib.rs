use std::{future::Future, time::Duration};

use async_trait::async_trait;
use basics_sdk::Ledger;
use solana_program_test::{processor, BanksClient, BanksClientError, ProgramTest, ProgramTestContext};
use solana_sdk::{
    account::Account,
    clock::{Clock, Slot},
    hash::Hash,
    instruction::{Instruction, InstructionError},
    native_token::LAMPORTS_PER_SOL,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    system_instruction,
    transaction::{Transaction, TransactionError},
};
use tokio::{sync::Mutex, time::sleep};

/// Lamports handed to every keypair funded through [`TestContext::fund_keypair_with_faucet`]
pub const FAUCET_LAMPORTS: u64 = 10 * LAMPORTS_PER_SOL;

const CONFIRM_TIMEOUT: Duration = Duration::from_secs(10);
const CONFIRM_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Program ids a [`ProgramTest`] registers the native processors under.
#[derive(Clone, Copy, Debug)]
pub struct ProgramIds {
    pub basics: Pubkey,
    pub staking: Pubkey,
    pub amm: Pubkey,
}

impl Default for ProgramIds {
    fn default() -> Self {
        Self {
            basics: basics::id(),
            staking: staking::id(),
            amm: amm::id(),
        }
    }
}

/// A `ProgramTest` with the native Basics, Staking and AMM processors
/// registered under their canonical ids.
pub fn program_test() -> ProgramTest {
    program_test_at(ProgramIds::default())
}

/// Like [`program_test`], with the programs deployed at `ids`.
pub fn program_test_at(ids: ProgramIds) -> ProgramTest {
    let mut program_test = ProgramTest::new(
        "basics",
        ids.basics,
        processor!(basics::processor::Processor::process),
    );
    program_test.add_program(
        "staking",
        ids.staking,
        processor!(staking::processor::Processor::process),
    );
    program_test.add_program(
        "amm",
        ids.amm,
        processor!(amm::processor::Processor::process),
    );
    program_test.prefer_bpf(false);
    program_test
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();
}

struct BankState {
    context: ProgramTestContext,
    slot: Slot,
}

/// In-process [`Ledger`] over a `ProgramTestContext`.
///
/// Airdrops are transfers from the genesis payer, submitted without waiting
/// so that confirmation is a separate step, as on a real cluster.
pub struct BanksLedger {
    banks: BanksClient,
    faucet: Keypair,
    // The in-process bank never leaves its slot on its own, and identical
    // transactions under one blockhash share a signature. Every blockhash
    // request therefore warps to the next slot.
    bank: Mutex<BankState>,
}

impl BanksLedger {
    pub async fn new(context: ProgramTestContext) -> anyhow::Result<Self> {
        let mut banks = context.banks_client.clone();
        let slot = banks.get_sysvar::<Clock>().await?.slot;
        Ok(Self {
            banks,
            faucet: context.payer.insecure_clone(),
            bank: Mutex::new(BankState { context, slot }),
        })
    }

    /// A handle on the underlying client.
    pub fn banks(&self) -> BanksClient {
        self.banks.clone()
    }

    /// Overwrite the clock sysvar of the working bank.
    pub async fn set_clock(&self, clock: &Clock) {
        self.bank.lock().await.context.set_sysvar(clock);
    }
}

#[async_trait]
impl Ledger for BanksLedger {
    async fn request_airdrop(&self, to: &Pubkey, lamports: u64) -> anyhow::Result<Signature> {
        let blockhash = self.latest_blockhash().await?;
        let transaction = Transaction::new_signed_with_payer(
            &[system_instruction::transfer(&self.faucet.pubkey(), to, lamports)],
            Some(&self.faucet.pubkey()),
            &[&self.faucet],
            blockhash,
        );
        let signature = transaction.signatures[0];
        self.banks().send_transaction(transaction).await?;
        tracing::debug!(%to, lamports, %signature, "airdrop sent");
        Ok(signature)
    }

    async fn confirm_transaction(&self, signature: &Signature) -> anyhow::Result<()> {
        let mut banks = self.banks();
        let deadline = tokio::time::Instant::now() + CONFIRM_TIMEOUT;
        loop {
            if let Some(status) = banks.get_transaction_status(*signature).await? {
                if let Some(err) = status.err {
                    anyhow::bail!("transaction {signature} failed: {err}");
                }
                return Ok(());
            }
            anyhow::ensure!(
                tokio::time::Instant::now() < deadline,
                "transaction {signature} not confirmed within {CONFIRM_TIMEOUT:?}"
            );
            sleep(CONFIRM_POLL_INTERVAL).await;
        }
    }

    async fn latest_blockhash(&self) -> anyhow::Result<Hash> {
        let mut bank = self.bank.lock().await;
        let next = bank.slot + 1;
        bank.context.warp_to_slot(next)?;
        bank.slot = next;
        Ok(self.banks().get_latest_blockhash().await?)
    }

    async fn send_and_confirm_transaction(
        &self,
        transaction: &Transaction,
    ) -> anyhow::Result<Signature> {
        self.banks().process_transaction(transaction.clone()).await?;
        Ok(transaction.signatures[0])
    }

    async fn get_account(&self, address: &Pubkey) -> anyhow::Result<Option<Account>> {
        Ok(self.banks().get_account(*address).await?)
    }

    async fn get_balance(&self, address: &Pubkey) -> anyhow::Result<u64> {
        Ok(self.banks().get_balance(*address).await?)
    }

    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> anyhow::Result<u64> {
        let rent = self.banks().get_rent().await?;
        Ok(rent.minimum_balance(data_len))
    }
}

/// Per-test handle: a fresh in-process ledger with all programs loaded.
pub struct TestContext {
    pub ledger: BanksLedger,
    pub program_ids: ProgramIds,
}

impl TestContext {
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_at(ProgramIds::default()).await
    }

    pub async fn start_at(program_ids: ProgramIds) -> anyhow::Result<Self> {
        let context = program_test_at(program_ids).start_with_context().await;
        let ledger = BanksLedger::new(context).await?;
        Ok(Self {
            ledger,
            program_ids,
        })
    }

    pub fn generate_new_keypair(&self) -> (Keypair, Pubkey) {
        let keypair = Keypair::new();
        let pubkey = keypair.pubkey();
        (keypair, pubkey)
    }

    /// Airdrop [`FAUCET_LAMPORTS`] to `keypair` and wait for it to land.
    pub async fn fund_keypair_with_faucet(&self, keypair: &Keypair) -> anyhow::Result<()> {
        let signature = self
            .ledger
            .request_airdrop(&keypair.pubkey(), FAUCET_LAMPORTS)
            .await?;
        self.ledger.confirm_transaction(&signature).await
    }

    /// Generate a keypair and fund it from the faucet.
    pub async fn funded_keypair(&self) -> anyhow::Result<(Keypair, Pubkey)> {
        let (keypair, pubkey) = self.generate_new_keypair();
        self.fund_keypair_with_faucet(&keypair).await?;
        Ok((keypair, pubkey))
    }

    pub async fn send_instructions(
        &self,
        instructions: &[Instruction],
        payer: &Keypair,
        signers: &[&Keypair],
    ) -> anyhow::Result<Signature> {
        self.ledger
            .send_instructions(instructions, payer, signers)
            .await
    }

    pub async fn clock(&self) -> anyhow::Result<Clock> {
        Ok(self.ledger.banks().get_sysvar::<Clock>().await?)
    }

    /// Move the cluster's unix timestamp forward by `seconds`.
    pub async fn advance_clock(&self, seconds: i64) -> anyhow::Result<Clock> {
        let mut clock = self.clock().await?;
        clock.unix_timestamp = clock
            .unix_timestamp
            .checked_add(seconds)
            .ok_or_else(|| anyhow::anyhow!("clock overflow"))?;
        self.ledger.set_clock(&clock).await;
        Ok(clock)
    }
}

pub struct TestRunner;

impl TestRunner {
    /// Start a fresh [`TestContext`], run `test` against it, and panic with
    /// the full error chain if it fails.
    pub async fn run<F, Fut>(test: F)
    where
        F: FnOnce(TestContext) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        Self::run_at(ProgramIds::default(), test).await
    }

    /// Like [`TestRunner::run`], with the programs deployed at `ids`.
    pub async fn run_at<F, Fut>(ids: ProgramIds, test: F)
    where
        F: FnOnce(TestContext) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        init_tracing();
        let result = match TestContext::start_at(ids).await {
            Ok(ctx) => test(ctx).await,
            Err(err) => Err(err.context("start test context")),
        };
        if let Err(err) = result {
            panic!("test failed: {err:#}");
        }
    }
}

/// The instruction error a failed transaction ended with, if any.
pub fn instruction_error(err: &anyhow::Error) -> Option<InstructionError> {
    let tx_err = match err.downcast_ref::<BanksClientError>()? {
        BanksClientError::TransactionError(tx_err) => tx_err,
        BanksClientError::SimulationError { err, .. } => err,
        _ => return None,
    };
    match tx_err {
        TransactionError::InstructionError(_, ix_err) => Some(ix_err.clone()),
        _ => None,
    }
}

/// The program-specific error code a failed transaction ended with, if any.
pub fn custom_error_code(err: &anyhow::Error) -> Option<u32> {
    match instruction_error(err)? {
        InstructionError::Custom(code) => Some(code),
        _ => None,
    }
}
