//! Fetch and decode program accounts from a [`Ledger`].

use amm::state::Pool;
use anyhow::Context as _;
use basics::state::NewAccount;
use solana_sdk::{program_pack::Pack, pubkey::Pubkey};
use staking::state::StakeAccount;
use tracing::debug;

use crate::ledger::Ledger;

/// Fetch the `NewAccount` record created by the Basics `Initialize` instruction.
///
/// Fails if the account does not exist, is not owned by `program_id`, or holds
/// no initialized record.
pub async fn read_new_account<L>(
    ledger: &L,
    program_id: &Pubkey,
    address: &Pubkey,
) -> anyhow::Result<NewAccount>
where
    L: Ledger + ?Sized,
{
    let account = ledger
        .get_account(address)
        .await?
        .with_context(|| format!("account {address} not found"))?;
    anyhow::ensure!(
        account.owner == *program_id,
        "account {address} is owned by {}, not {program_id}",
        account.owner
    );
    debug!(%address, len = account.data.len(), "read new account");
    NewAccount::unpack(&account.data).with_context(|| format!("decode NewAccount {address}"))
}

/// Fetch the stake account of `owner`, if it has been created.
pub async fn read_stake_account<L>(
    ledger: &L,
    program_id: &Pubkey,
    owner: &Pubkey,
) -> anyhow::Result<Option<StakeAccount>>
where
    L: Ledger + ?Sized,
{
    let (address, _bump) = staking::find_stake_account_pda_with_program(program_id, owner);
    let Some(account) = ledger.get_account(&address).await? else {
        return Ok(None);
    };
    anyhow::ensure!(
        account.owner == *program_id,
        "stake account {address} is owned by {}",
        account.owner
    );
    let stake_account = StakeAccount::unpack(&account.data)
        .with_context(|| format!("decode StakeAccount {address}"))?;
    Ok(Some(stake_account))
}

/// Fetch the pool for an ordered mint pair, if it has been created.
pub async fn read_pool<L>(
    ledger: &L,
    program_id: &Pubkey,
    token_a_mint: &Pubkey,
    token_b_mint: &Pubkey,
) -> anyhow::Result<Option<Pool>>
where
    L: Ledger + ?Sized,
{
    let (address, _bump) =
        amm::find_pool_pda_with_program(program_id, token_a_mint, token_b_mint);
    let Some(account) = ledger.get_account(&address).await? else {
        return Ok(None);
    };
    anyhow::ensure!(
        account.owner == *program_id,
        "pool {address} is owned by {}",
        account.owner
    );
    debug!(%address, "read pool");
    let pool = Pool::unpack(&account.data).with_context(|| format!("decode Pool {address}"))?;
    Ok(Some(pool))
}
