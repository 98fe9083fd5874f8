use basics_sdk::{read_stake_account, ClaimPointsParams, Ledger, StakingClient};
use basics_tests::{
    custom_error_code, instruction_error, ProgramIds, TestContext, TestRunner,
};
use solana_sdk::{
    instruction::{AccountMeta, InstructionError},
    native_token::LAMPORTS_PER_SOL,
    program_pack::Pack,
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
    system_instruction,
};
use staking::{error::StakeError, points::SECONDS_PER_DAY, state::StakeAccount};

async fn staker(ctx: &TestContext) -> anyhow::Result<(Keypair, Pubkey)> {
    let (owner_kp, owner_pk) = ctx.funded_keypair().await?;
    let client = StakingClient::new(staking::id());
    ctx.send_instructions(&[client.initialize_ix(owner_pk)], &owner_kp, &[])
        .await?;
    Ok((owner_kp, owner_pk))
}

async fn stake_record(ctx: &TestContext, owner: &Pubkey) -> anyhow::Result<StakeAccount> {
    read_stake_account(&ctx.ledger, &staking::id(), owner)
        .await?
        .ok_or_else(|| anyhow::anyhow!("stake account for {owner} missing"))
}

/// Create the reward mint and a token account for `owner`, returning the
/// token account address.
async fn reward_accounts(
    ctx: &TestContext,
    owner: &Keypair,
    mint: &Keypair,
) -> anyhow::Result<Pubkey> {
    let client = StakingClient::new(staking::id());
    let mint_rent = ctx
        .ledger
        .minimum_balance_for_rent_exemption(spl_token::state::Mint::LEN)
        .await?;
    let mint_ixs = client.create_reward_mint_tx(owner.pubkey(), mint.pubkey(), mint_rent)?;
    ctx.send_instructions(&mint_ixs, owner, &[mint]).await?;

    let token_account = Keypair::new();
    let account_rent = ctx
        .ledger
        .minimum_balance_for_rent_exemption(spl_token::state::Account::LEN)
        .await?;
    let account_ixs = client.create_token_account_tx(
        owner.pubkey(),
        token_account.pubkey(),
        mint.pubkey(),
        owner.pubkey(),
        account_rent,
    )?;
    ctx.send_instructions(&account_ixs, owner, &[&token_account])
        .await?;
    Ok(token_account.pubkey())
}

/// Create a 6-decimal mint controlled by `authority` rather than the program.
async fn foreign_mint(ctx: &TestContext, payer: &Keypair, authority: &Pubkey) -> anyhow::Result<Pubkey> {
    let mint = Keypair::new();
    let rent = ctx
        .ledger
        .minimum_balance_for_rent_exemption(spl_token::state::Mint::LEN)
        .await?;
    let ixs = [
        system_instruction::create_account(
            &payer.pubkey(),
            &mint.pubkey(),
            rent,
            spl_token::state::Mint::LEN as u64,
            &spl_token::id(),
        ),
        spl_token::instruction::initialize_mint2(
            &spl_token::id(),
            &mint.pubkey(),
            authority,
            None,
            staking::points::TOKEN_DECIMALS,
        )?,
    ];
    ctx.send_instructions(&ixs, payer, &[&mint]).await?;
    Ok(mint.pubkey())
}

/// Create a token account for `mint` owned by `owner`.
async fn token_account_for(
    ctx: &TestContext,
    owner: &Keypair,
    mint: &Pubkey,
) -> anyhow::Result<Pubkey> {
    let account = Keypair::new();
    let rent = ctx
        .ledger
        .minimum_balance_for_rent_exemption(spl_token::state::Account::LEN)
        .await?;
    let ixs = StakingClient::new(staking::id()).create_token_account_tx(
        owner.pubkey(),
        account.pubkey(),
        *mint,
        owner.pubkey(),
        rent,
    )?;
    ctx.send_instructions(&ixs, owner, &[&account]).await?;
    Ok(account.pubkey())
}

async fn token_balance(ctx: &TestContext, token_account: &Pubkey) -> anyhow::Result<u64> {
    let account = ctx
        .ledger
        .get_account(token_account)
        .await?
        .ok_or_else(|| anyhow::anyhow!("token account {token_account} missing"))?;
    Ok(spl_token::state::Account::unpack(&account.data)?.amount)
}

#[tokio::test]
async fn initialize_creates_stake_account_pda() {
    TestRunner::run(|ctx| async move {
        let (_owner_kp, owner_pk) = staker(&ctx).await?;
        let client = StakingClient::new(staking::id());

        let account = ctx
            .ledger
            .get_account(&client.stake_account_pda(&owner_pk))
            .await?
            .expect("stake account exists");
        assert_eq!(account.owner, staking::id());
        assert_eq!(account.data.len(), StakeAccount::LEN);

        let record = stake_record(&ctx, &owner_pk).await?;
        assert!(record.is_initialized);
        assert_eq!(record.owner, owner_pk);
        assert_eq!(record.staked_amount, 0);
        assert_eq!(record.total_points, 0);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn initialize_twice_fails() {
    TestRunner::run(|ctx| async move {
        let (owner_kp, owner_pk) = staker(&ctx).await?;
        let client = StakingClient::new(staking::id());

        let err = ctx
            .send_instructions(&[client.initialize_ix(owner_pk)], &owner_kp, &[])
            .await
            .expect_err("stake account already exists");
        assert_eq!(
            instruction_error(&err),
            Some(InstructionError::AccountAlreadyInitialized)
        );
        Ok(())
    })
    .await
}

#[tokio::test]
async fn stake_moves_lamports_into_pda() {
    TestRunner::run(|ctx| async move {
        let (owner_kp, owner_pk) = staker(&ctx).await?;
        let client = StakingClient::new(staking::id());
        let pda = client.stake_account_pda(&owner_pk);
        let before = ctx.ledger.get_balance(&pda).await?;

        ctx.send_instructions(
            &[client.stake_ix(owner_pk, LAMPORTS_PER_SOL)?],
            &owner_kp,
            &[],
        )
        .await?;

        assert_eq!(ctx.ledger.get_balance(&pda).await?, before + LAMPORTS_PER_SOL);
        let record = stake_record(&ctx, &owner_pk).await?;
        assert_eq!(record.staked_amount, LAMPORTS_PER_SOL);
        assert_eq!(record.last_update_time, ctx.clock().await?.unix_timestamp);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn zero_stake_is_rejected_on_chain() {
    TestRunner::run(|ctx| async move {
        let (owner_kp, owner_pk) = staker(&ctx).await?;

        let ix = staking::instruction::stake(&staking::id(), &owner_pk, 0);
        let err = ctx
            .send_instructions(&[ix], &owner_kp, &[])
            .await
            .expect_err("zero stake must fail");
        assert_eq!(
            custom_error_code(&err),
            Some(StakeError::InvalidAmount as u32)
        );
        Ok(())
    })
    .await
}

#[tokio::test]
async fn points_accrue_with_time() {
    TestRunner::run(|ctx| async move {
        let (owner_kp, owner_pk) = staker(&ctx).await?;
        let client = StakingClient::new(staking::id());
        ctx.send_instructions(
            &[client.stake_ix(owner_pk, 2 * LAMPORTS_PER_SOL)?],
            &owner_kp,
            &[],
        )
        .await?;

        ctx.advance_clock(SECONDS_PER_DAY as i64).await?;
        // Any state-changing call settles accrued points
        ctx.send_instructions(&[client.stake_ix(owner_pk, 1)?], &owner_kp, &[])
            .await?;

        let record = stake_record(&ctx, &owner_pk).await?;
        assert_eq!(record.total_points, 2_000_000);
        assert_eq!(record.staked_amount, 2 * LAMPORTS_PER_SOL + 1);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn unstake_returns_lamports_to_owner() {
    TestRunner::run(|ctx| async move {
        let (owner_kp, owner_pk) = staker(&ctx).await?;
        let client = StakingClient::new(staking::id());
        let pda = client.stake_account_pda(&owner_pk);
        ctx.send_instructions(
            &[client.stake_ix(owner_pk, LAMPORTS_PER_SOL)?],
            &owner_kp,
            &[],
        )
        .await?;
        let pda_before = ctx.ledger.get_balance(&pda).await?;
        let owner_before = ctx.ledger.get_balance(&owner_pk).await?;

        ctx.send_instructions(
            &[client.unstake_ix(owner_pk, LAMPORTS_PER_SOL / 2)?],
            &owner_kp,
            &[],
        )
        .await?;

        assert_eq!(
            ctx.ledger.get_balance(&pda).await?,
            pda_before - LAMPORTS_PER_SOL / 2
        );
        // The owner also paid the transaction fee
        let owner_after = ctx.ledger.get_balance(&owner_pk).await?;
        assert!(owner_after > owner_before);
        assert!(owner_after <= owner_before + LAMPORTS_PER_SOL / 2);

        let record = stake_record(&ctx, &owner_pk).await?;
        assert_eq!(record.staked_amount, LAMPORTS_PER_SOL / 2);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn unstake_more_than_staked_fails() {
    TestRunner::run(|ctx| async move {
        let (owner_kp, owner_pk) = staker(&ctx).await?;
        let client = StakingClient::new(staking::id());
        ctx.send_instructions(&[client.stake_ix(owner_pk, 1_000)?], &owner_kp, &[])
            .await?;

        let err = ctx
            .send_instructions(&[client.unstake_ix(owner_pk, 1_001)?], &owner_kp, &[])
            .await
            .expect_err("cannot unstake more than staked");
        assert_eq!(
            custom_error_code(&err),
            Some(StakeError::InsufficientStake as u32)
        );
        assert_eq!(stake_record(&ctx, &owner_pk).await?.staked_amount, 1_000);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn another_owner_cannot_unstake() {
    TestRunner::run(|ctx| async move {
        let (victim_kp, victim_pk) = staker(&ctx).await?;
        let (thief_kp, _thief_pk) = staker(&ctx).await?;
        let client = StakingClient::new(staking::id());
        ctx.send_instructions(
            &[client.stake_ix(victim_pk, LAMPORTS_PER_SOL)?],
            &victim_kp,
            &[],
        )
        .await?;

        let mut ix = client.unstake_ix(thief_kp.pubkey(), LAMPORTS_PER_SOL)?;
        ix.accounts[0].pubkey = client.stake_account_pda(&victim_pk);
        let err = ctx
            .send_instructions(&[ix], &thief_kp, &[])
            .await
            .expect_err("foreign stake account must be rejected");
        assert_eq!(
            custom_error_code(&err),
            Some(StakeError::Unauthorized as u32)
        );
        assert_eq!(
            stake_record(&ctx, &victim_pk).await?.staked_amount,
            LAMPORTS_PER_SOL
        );
        Ok(())
    })
    .await
}

#[tokio::test]
async fn claim_points_mints_reward_tokens() {
    TestRunner::run(|ctx| async move {
        let (owner_kp, owner_pk) = staker(&ctx).await?;
        let client = StakingClient::new(staking::id());
        let mint = Keypair::new();
        let token_account = reward_accounts(&ctx, &owner_kp, &mint).await?;

        ctx.send_instructions(
            &[client.stake_ix(owner_pk, LAMPORTS_PER_SOL)?],
            &owner_kp,
            &[],
        )
        .await?;
        ctx.advance_clock(SECONDS_PER_DAY as i64).await?;

        let claim = client.claim_points_ix(ClaimPointsParams {
            owner: owner_pk,
            reward_mint: mint.pubkey(),
            user_token_account: token_account,
        });
        ctx.send_instructions(&[claim.clone()], &owner_kp, &[]).await?;

        assert_eq!(token_balance(&ctx, &token_account).await?, 1_000_000);
        let record = stake_record(&ctx, &owner_pk).await?;
        assert_eq!(record.total_points, 0);
        assert_eq!(record.staked_amount, LAMPORTS_PER_SOL);

        // Nothing has accrued since the claim
        let err = ctx
            .send_instructions(&[claim], &owner_kp, &[])
            .await
            .expect_err("no points left to claim");
        assert_eq!(
            custom_error_code(&err),
            Some(StakeError::InsufficientTokenPoints as u32)
        );
        Ok(())
    })
    .await
}

#[tokio::test]
async fn claim_into_foreign_token_account_fails() {
    TestRunner::run(|ctx| async move {
        let (owner_kp, owner_pk) = staker(&ctx).await?;
        let (other_kp, _other_pk) = ctx.funded_keypair().await?;
        let client = StakingClient::new(staking::id());
        let mint = Keypair::new();
        let foreign = reward_accounts(&ctx, &other_kp, &mint).await?;

        ctx.send_instructions(
            &[client.stake_ix(owner_pk, LAMPORTS_PER_SOL)?],
            &owner_kp,
            &[],
        )
        .await?;
        ctx.advance_clock(SECONDS_PER_DAY as i64).await?;

        let claim = client.claim_points_ix(ClaimPointsParams {
            owner: owner_pk,
            reward_mint: mint.pubkey(),
            user_token_account: foreign,
        });
        let err = ctx
            .send_instructions(&[claim], &owner_kp, &[])
            .await
            .expect_err("token account belongs to someone else");
        assert_eq!(
            custom_error_code(&err),
            Some(StakeError::InvalidOwner as u32)
        );
        assert_eq!(token_balance(&ctx, &foreign).await?, 0);
        Ok(())
    })
    .await
}

// The PDA address is public; lamports sent there ahead of time must not
// block the owner from initializing
#[tokio::test]
async fn initialize_succeeds_on_prefunded_pda() {
    TestRunner::run(|ctx| async move {
        let (owner_kp, owner_pk) = ctx.funded_keypair().await?;
        let (griefer_kp, griefer_pk) = ctx.funded_keypair().await?;
        let client = StakingClient::new(staking::id());
        let pda = client.stake_account_pda(&owner_pk);

        ctx.send_instructions(
            &[system_instruction::transfer(&griefer_pk, &pda, 1_000_000)],
            &griefer_kp,
            &[],
        )
        .await?;
        ctx.send_instructions(&[client.initialize_ix(owner_pk)], &owner_kp, &[])
            .await?;

        let account = ctx.ledger.get_account(&pda).await?.expect("stake account exists");
        let rent_exempt = ctx
            .ledger
            .minimum_balance_for_rent_exemption(StakeAccount::LEN)
            .await?;
        assert_eq!(account.owner, staking::id());
        assert_eq!(account.data.len(), StakeAccount::LEN);
        assert_eq!(account.lamports, rent_exempt.max(1_000_000));
        assert_eq!(stake_record(&ctx, &owner_pk).await?.owner, owner_pk);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn initialize_at_non_pda_address_fails() {
    TestRunner::run(|ctx| async move {
        let (owner_kp, owner_pk) = ctx.funded_keypair().await?;
        let client = StakingClient::new(staking::id());

        let mut ix = client.initialize_ix(owner_pk);
        ix.accounts[0] = AccountMeta::new(Pubkey::new_unique(), false);
        let err = ctx
            .send_instructions(&[ix], &owner_kp, &[])
            .await
            .expect_err("stake account must be the owner's PDA");
        assert_eq!(
            custom_error_code(&err),
            Some(StakeError::InvalidStakeAccount as u32)
        );
        Ok(())
    })
    .await
}

#[tokio::test]
async fn stake_into_account_not_owned_by_program_fails() {
    TestRunner::run(|ctx| async move {
        let (owner_kp, owner_pk) = staker(&ctx).await?;
        let (_other_kp, other_pk) = ctx.funded_keypair().await?;
        let client = StakingClient::new(staking::id());

        let mut ix = client.stake_ix(owner_pk, 1_000)?;
        ix.accounts[0] = AccountMeta::new(other_pk, false);
        let err = ctx
            .send_instructions(&[ix], &owner_kp, &[])
            .await
            .expect_err("system-owned account is not a stake account");
        assert_eq!(
            custom_error_code(&err),
            Some(StakeError::InvalidStakeAccount as u32)
        );
        Ok(())
    })
    .await
}

#[tokio::test]
async fn wrong_system_program_fails() {
    TestRunner::run(|ctx| async move {
        let (owner_kp, owner_pk) = ctx.funded_keypair().await?;
        let client = StakingClient::new(staking::id());

        let mut init = client.initialize_ix(owner_pk);
        init.accounts[2] = AccountMeta::new_readonly(Pubkey::new_unique(), false);
        let err = ctx
            .send_instructions(&[init], &owner_kp, &[])
            .await
            .expect_err("fake system program on initialize");
        assert_eq!(
            instruction_error(&err),
            Some(InstructionError::IncorrectProgramId)
        );

        ctx.send_instructions(&[client.initialize_ix(owner_pk)], &owner_kp, &[])
            .await?;
        let mut stake = client.stake_ix(owner_pk, 1_000)?;
        stake.accounts[2] = AccountMeta::new_readonly(Pubkey::new_unique(), false);
        let err = ctx
            .send_instructions(&[stake], &owner_kp, &[])
            .await
            .expect_err("fake system program on stake");
        assert_eq!(
            instruction_error(&err),
            Some(InstructionError::IncorrectProgramId)
        );
        Ok(())
    })
    .await
}

#[tokio::test]
async fn claim_with_wrong_token_program_fails() {
    TestRunner::run(|ctx| async move {
        let (owner_kp, owner_pk) = staker(&ctx).await?;
        let client = StakingClient::new(staking::id());
        let mint = Keypair::new();
        let token_account = reward_accounts(&ctx, &owner_kp, &mint).await?;

        let mut claim = client.claim_points_ix(ClaimPointsParams {
            owner: owner_pk,
            reward_mint: mint.pubkey(),
            user_token_account: token_account,
        });
        claim.accounts[5] = AccountMeta::new_readonly(Pubkey::new_unique(), false);
        let err = ctx
            .send_instructions(&[claim], &owner_kp, &[])
            .await
            .expect_err("fake token program");
        assert_eq!(
            instruction_error(&err),
            Some(InstructionError::IncorrectProgramId)
        );
        Ok(())
    })
    .await
}

#[tokio::test]
async fn claim_from_mint_with_other_authority_fails() {
    TestRunner::run(|ctx| async move {
        let (owner_kp, owner_pk) = staker(&ctx).await?;
        let client = StakingClient::new(staking::id());
        let mint = foreign_mint(&ctx, &owner_kp, &owner_pk).await?;
        let token_account = token_account_for(&ctx, &owner_kp, &mint).await?;

        let claim = client.claim_points_ix(ClaimPointsParams {
            owner: owner_pk,
            reward_mint: mint,
            user_token_account: token_account,
        });
        let err = ctx
            .send_instructions(&[claim], &owner_kp, &[])
            .await
            .expect_err("mint authority is not the program's PDA");
        assert_eq!(
            custom_error_code(&err),
            Some(StakeError::InvalidMintAuthority as u32)
        );
        Ok(())
    })
    .await
}

#[tokio::test]
async fn claim_with_substituted_authority_account_fails() {
    TestRunner::run(|ctx| async move {
        let (owner_kp, owner_pk) = staker(&ctx).await?;
        let client = StakingClient::new(staking::id());
        let mint = Keypair::new();
        let token_account = reward_accounts(&ctx, &owner_kp, &mint).await?;

        let mut claim = client.claim_points_ix(ClaimPointsParams {
            owner: owner_pk,
            reward_mint: mint.pubkey(),
            user_token_account: token_account,
        });
        claim.accounts[3] = AccountMeta::new_readonly(Pubkey::new_unique(), false);
        let err = ctx
            .send_instructions(&[claim], &owner_kp, &[])
            .await
            .expect_err("authority account must be the PDA");
        assert_eq!(
            custom_error_code(&err),
            Some(StakeError::InvalidMintAuthority as u32)
        );
        Ok(())
    })
    .await
}

#[tokio::test]
async fn claim_into_token_account_of_other_mint_fails() {
    TestRunner::run(|ctx| async move {
        let (owner_kp, owner_pk) = staker(&ctx).await?;
        let client = StakingClient::new(staking::id());
        let reward_mint = Keypair::new();
        reward_accounts(&ctx, &owner_kp, &reward_mint).await?;
        let other_mint = foreign_mint(&ctx, &owner_kp, &owner_pk).await?;
        let wrong_account = token_account_for(&ctx, &owner_kp, &other_mint).await?;

        let claim = client.claim_points_ix(ClaimPointsParams {
            owner: owner_pk,
            reward_mint: reward_mint.pubkey(),
            user_token_account: wrong_account,
        });
        let err = ctx
            .send_instructions(&[claim], &owner_kp, &[])
            .await
            .expect_err("token account is for another mint");
        assert_eq!(
            custom_error_code(&err),
            Some(StakeError::InvalidTokenAccount as u32)
        );
        Ok(())
    })
    .await
}

#[tokio::test]
async fn staking_works_at_relocated_program_id() {
    let ids = ProgramIds {
        staking: Pubkey::new_unique(),
        ..ProgramIds::default()
    };
    TestRunner::run_at(ids, |ctx| async move {
        let program_id = ctx.program_ids.staking;
        let (owner_kp, owner_pk) = ctx.funded_keypair().await?;
        let client = StakingClient::new(program_id);

        ctx.send_instructions(
            &client.initialize_and_stake_tx(owner_pk, LAMPORTS_PER_SOL)?,
            &owner_kp,
            &[],
        )
        .await?;

        let record = read_stake_account(&ctx.ledger, &program_id, &owner_pk)
            .await?
            .expect("stake account exists");
        assert_eq!(record.staked_amount, LAMPORTS_PER_SOL);
        assert!(read_stake_account(&ctx.ledger, &staking::id(), &owner_pk)
            .await?
            .is_none());
        Ok(())
    })
    .await
}
