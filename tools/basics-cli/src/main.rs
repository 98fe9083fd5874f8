use anyhow::Context as _;
use basics_sdk::{
    read_new_account, read_pool, read_stake_account, BasicsClient, ClaimPointsParams, InitializeParams,
    InitializeScenario, Ledger, LedgerConfig, RpcLedger, ScenarioConfig, StakingClient,
};
use clap::{Args, Parser, Subcommand};
use solana_sdk::{
    native_token::LAMPORTS_PER_SOL,
    program_pack::Pack,
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair},
    signer::Signer,
};
use std::str::FromStr;
use tracing::info;
use zeroize::Zeroizing;

fn parse_pubkey(s: &str) -> anyhow::Result<Pubkey> {
    Pubkey::from_str(s.trim()).with_context(|| format!("invalid pubkey {s}"))
}

#[derive(Clone, Debug)]
enum SignerSourceKind {
    Prompt,
    Stdin,
    File,
    Env,
}

#[derive(Clone, Debug, Args)]
struct SignerArg {
    /// Signer source: prompt|stdin|file:/path|env:VAR
    #[arg(long = "payer", alias = "signer", default_value = "prompt")]
    signer: String,
}

fn keypair_from_hex(secret: &str) -> anyhow::Result<Keypair> {
    let bytes = Zeroizing::new(hex::decode(secret.trim())?);
    anyhow::ensure!(bytes.len() == 64, "expected 64-byte hex secret key");
    Keypair::try_from(bytes.as_slice()).map_err(|e| anyhow::anyhow!("invalid secret key: {e}"))
}

fn keypair_from_source(source: &str) -> anyhow::Result<Keypair> {
    use std::io::Read as _;
    let (kind, rest) = if let Some(rest) = source.strip_prefix("file:") {
        (SignerSourceKind::File, rest)
    } else if let Some(rest) = source.strip_prefix("env:") {
        (SignerSourceKind::Env, rest)
    } else if source == "stdin" {
        (SignerSourceKind::Stdin, "")
    } else {
        (SignerSourceKind::Prompt, "")
    };

    match kind {
        SignerSourceKind::Prompt => {
            let s = Zeroizing::new(rpassword::prompt_password("enter signer secret key hex: ")?);
            keypair_from_hex(&s)
        }
        SignerSourceKind::Stdin => {
            let mut buf = Zeroizing::new(String::new());
            std::io::stdin().read_to_string(&mut buf)?;
            keypair_from_hex(&buf)
        }
        // Accepts a solana-keygen JSON keypair file
        SignerSourceKind::File => {
            read_keypair_file(rest).map_err(|e| anyhow::anyhow!("read {rest}: {e}"))
        }
        SignerSourceKind::Env => {
            let s = Zeroizing::new(
                std::env::var(rest).with_context(|| format!("env {rest} not set"))?,
            );
            keypair_from_hex(&s)
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "basics",
    version,
    about = "Basics CLI",
    long_about = "Command-line interface for the Basics, Staking and AMM programs.\nJSON is always printed to stdout; logs/status to stderr."
)]
struct Cli {
    /// RPC endpoint URL
    #[arg(env = "BASICS_RPC_URL", global = true, long)]
    rpc: Option<String>,

    /// Basics program id (base58)
    #[arg(env = "BASICS_PROGRAM_ID", global = true, long)]
    basics_program_id: Option<String>,

    /// Staking program id (base58)
    #[arg(env = "STAKING_PROGRAM_ID", global = true, long)]
    staking_program_id: Option<String>,

    /// AMM program id (base58)
    #[arg(env = "AMM_PROGRAM_ID", global = true, long)]
    amm_program_id: Option<String>,

    /// Log debug output to stderr
    #[arg(global = true, long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn ledger_config(&self) -> anyhow::Result<LedgerConfig> {
        let mut config = LedgerConfig::default();
        if let Some(rpc) = &self.rpc {
            config.rpc_url = rpc.clone();
        }
        if let Some(id) = &self.basics_program_id {
            config.basics_program_id = parse_pubkey(id)?;
        }
        if let Some(id) = &self.staking_program_id {
            config.staking_program_id = parse_pubkey(id)?;
        }
        if let Some(id) = &self.amm_program_id {
            config.amm_program_id = parse_pubkey(id)?;
        }
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Request lamports from the faucet and wait for confirmation
    #[command(about = "Request an airdrop and wait for it to confirm")]
    Airdrop {
        /// Recipient
        #[arg(long)]
        to: String,
        /// Lamports to request
        #[arg(long, default_value_t = LAMPORTS_PER_SOL)]
        lamports: u64,
    },

    /// Create a fresh account holding `value`
    #[command(alias = "init", about = "Create a fresh account storing a u64")]
    Initialize {
        /// Value to store
        #[arg(long, default_value_t = 1)]
        value: u64,
        /// Payer signer source
        #[command(flatten)]
        payer: SignerArg,
    },

    /// Show an account created by initialize
    #[command(alias = "get", about = "Show the stored value of an account")]
    Show {
        #[arg(long)]
        account: String,
    },

    /// Fund fresh keypairs, initialize and verify in one go
    #[command(about = "Run the airdrop, initialize and verify flow")]
    Scenario {
        /// Value to store and expect back
        #[arg(long, default_value_t = 1)]
        value: u64,
        /// Lamports per airdrop
        #[arg(long, default_value_t = LAMPORTS_PER_SOL)]
        lamports: u64,
    },

    /// Stake lamports, creating the stake account first if needed
    Stake {
        #[arg(long)]
        amount: u64,
        #[command(flatten)]
        payer: SignerArg,
    },

    /// Withdraw staked lamports
    Unstake {
        #[arg(long)]
        amount: u64,
        #[command(flatten)]
        payer: SignerArg,
    },

    /// Mint accrued points as reward tokens
    #[command(alias = "claim")]
    ClaimPoints {
        /// Reward mint (authority must be the program's mint authority PDA)
        #[arg(long)]
        mint: String,
        /// Owner's token account for the reward mint
        #[arg(long)]
        token_account: String,
        #[command(flatten)]
        payer: SignerArg,
    },

    /// Show a stake account
    ShowStake {
        #[arg(long)]
        owner: String,
    },

    /// Show the AMM pool for an ordered mint pair
    ShowPool {
        #[arg(long)]
        mint_a: String,
        #[arg(long)]
        mint_b: String,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json(value: serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv().ok();
    let args = Cli::parse();
    init_logging(args.verbose);

    let config = args.ledger_config()?;
    let ledger = RpcLedger::from_config(&config);
    let staking = StakingClient::new(config.staking_program_id);

    match args.command {
        Commands::Airdrop { to, lamports } => {
            let to = parse_pubkey(&to)?;
            let signature = ledger.request_airdrop(&to, lamports).await?;
            ledger.confirm_transaction(&signature).await?;
            let balance = ledger.get_balance(&to).await?;
            info!(%to, lamports, %signature, "airdrop confirmed");
            print_json(serde_json::json!({
                "signature": signature.to_string(),
                "to": to.to_string(),
                "balance": balance,
            }))?;
        }
        Commands::Initialize { value, payer } => {
            let payer_kp = keypair_from_source(&payer.signer)?;
            let new_account = Keypair::new();
            let ix = BasicsClient::new(config.basics_program_id).initialize_ix(InitializeParams {
                new_account: new_account.pubkey(),
                signer: payer_kp.pubkey(),
                data: value,
            });
            let signature = ledger
                .send_instructions(&[ix], &payer_kp, &[&new_account])
                .await?;
            info!(%signature, "Your transaction signature");
            print_json(serde_json::json!({
                "signature": signature.to_string(),
                "new_account": new_account.pubkey().to_string(),
                "data": value,
            }))?;
        }
        Commands::Show { account } => {
            let address = parse_pubkey(&account)?;
            let record = read_new_account(&ledger, &config.basics_program_id, &address).await?;
            print_json(serde_json::json!({
                "account": address.to_string(),
                "is_initialized": record.is_initialized,
                "data": record.data,
            }))?;
        }
        Commands::Scenario { value, lamports } => {
            let report = InitializeScenario::new(&ledger, config.basics_program_id)
                .with_config(ScenarioConfig {
                    airdrop_lamports: lamports,
                    value,
                })
                .run()
                .await?;
            print_json(serde_json::json!({
                "signer": report.signer.to_string(),
                "new_account": report.new_account.to_string(),
                "signature": report.signature.to_string(),
                "data": report.data,
            }))?;
        }
        Commands::Stake { amount, payer } => {
            let payer_kp = keypair_from_source(&payer.signer)?;
            let owner = payer_kp.pubkey();
            let existing =
                read_stake_account(&ledger, &config.staking_program_id, &owner).await?;
            let ixs = match existing {
                Some(_) => vec![staking.stake_ix(owner, amount)?],
                None => staking.initialize_and_stake_tx(owner, amount)?,
            };
            let signature = ledger.send_instructions(&ixs, &payer_kp, &[]).await?;
            eprintln!("stake: signature={signature}");
            print_json(serde_json::json!({
                "signature": signature.to_string(),
                "stake_account": staking.stake_account_pda(&owner).to_string(),
                "created": existing.is_none(),
                "amount": amount,
            }))?;
        }
        Commands::Unstake { amount, payer } => {
            let payer_kp = keypair_from_source(&payer.signer)?;
            let ix = staking.unstake_ix(payer_kp.pubkey(), amount)?;
            let signature = ledger.send_instructions(&[ix], &payer_kp, &[]).await?;
            eprintln!("unstake: signature={signature}");
            print_json(serde_json::json!({
                "signature": signature.to_string(),
                "amount": amount,
            }))?;
        }
        Commands::ClaimPoints {
            mint,
            token_account,
            payer,
        } => {
            let payer_kp = keypair_from_source(&payer.signer)?;
            let user_token_account = parse_pubkey(&token_account)?;
            let ix = staking.claim_points_ix(ClaimPointsParams {
                owner: payer_kp.pubkey(),
                reward_mint: parse_pubkey(&mint)?,
                user_token_account,
            });
            let signature = ledger.send_instructions(&[ix], &payer_kp, &[]).await?;
            eprintln!("claim-points: signature={signature}");

            let balance = match ledger.get_account(&user_token_account).await? {
                Some(account) => Some(spl_token::state::Account::unpack(&account.data)?.amount),
                None => None,
            };
            print_json(serde_json::json!({
                "signature": signature.to_string(),
                "token_balance": balance,
            }))?;
        }
        Commands::ShowStake { owner } => {
            let owner = parse_pubkey(&owner)?;
            let stake = read_stake_account(&ledger, &config.staking_program_id, &owner).await?;
            let stake_json = stake.map(|s| {
                serde_json::json!({
                    "is_initialized": s.is_initialized,
                    "owner": s.owner.to_string(),
                    "staked_amount": s.staked_amount,
                    "total_points": s.total_points,
                    "last_update_time": s.last_update_time,
                })
            });
            print_json(serde_json::json!({
                "stake_account": staking.stake_account_pda(&owner).to_string(),
                "stake": stake_json,
            }))?;
        }
        Commands::ShowPool { mint_a, mint_b } => {
            let (mint_a, mint_b) = (parse_pubkey(&mint_a)?, parse_pubkey(&mint_b)?);
            let pool = read_pool(&ledger, &config.amm_program_id, &mint_a, &mint_b).await?;
            let pool_json = pool.map(|p| {
                serde_json::json!({
                    "lp_mint": p.lp_mint.to_string(),
                    "reserve_a": p.reserve_a.to_string(),
                    "reserve_b": p.reserve_b.to_string(),
                    "pool_authority": p.pool_authority.to_string(),
                    "lp_supply": p.lp_supply,
                })
            });
            let (address, _) =
                amm::find_pool_pda_with_program(&config.amm_program_id, &mint_a, &mint_b);
            print_json(serde_json::json!({
                "pool": address.to_string(),
                "state": pool_json,
            }))?;
        }
    }

    Ok(())
}
