//! Command Line Interface for the constant-product router.
use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use cp_router_domain::math::constant_product::spot_price;
use cp_router_domain::{Address, Token, U256, format_address, parse_address};
use cp_router_execution::config::{
    ENV_FACTORY, ENV_FEE_RECIPIENT, ENV_PROTOCOL_FEE_BPS, ENV_ROUTER, ENV_WRAPPED_NATIVE,
};
use cp_router_execution::prelude::*;
use cp_router_protocols::ReserveOracle;
use cp_router_protocols::fixture::LedgerFixture;
use cp_router_protocols::memory::InMemoryLedger;
use dotenv::dotenv;
use prettytable::{Table, row};
use rust_decimal::Decimal;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Seconds added to the current time when `--deadline` is omitted.
const DEFAULT_DEADLINE_SECS: u64 = 20 * 60;
const MAX_DECIMAL_SCALE: u32 = 28;

#[derive(Parser)]
#[command(name = "cp-router")]
#[command(about = "Constant-product AMM router: quotes and simulated swaps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RouterArgs {
    /// Ledger fixture (JSON) holding pools and balances
    #[arg(short, long, default_value = "fixtures/mainnet.json")]
    fixture: PathBuf,

    /// Router settlement account (overrides ROUTER_ADDRESS)
    #[arg(long)]
    router: Option<String>,

    /// Protocol fee recipient (overrides ROUTER_FEE_RECIPIENT)
    #[arg(long)]
    fee_recipient: Option<String>,

    /// Protocol fee in basis points (overrides ROUTER_PROTOCOL_FEE_BPS)
    #[arg(long)]
    fee_bps: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote selling an exact input amount along a path
    QuoteOut {
        #[command(flatten)]
        router: RouterArgs,

        /// Input amount in token units (e.g., 0.01)
        #[arg(long)]
        amount_in: String,

        /// Comma separated symbols or addresses (e.g., WETH,UNI,DAI)
        #[arg(long, value_delimiter = ',', required = true)]
        path: Vec<String>,
    },
    /// Quote buying an exact output amount along a path
    QuoteIn {
        #[command(flatten)]
        router: RouterArgs,

        /// Output amount in token units
        #[arg(long)]
        amount_out: String,

        /// Comma separated symbols or addresses
        #[arg(long, value_delimiter = ',', required = true)]
        path: Vec<String>,
    },
    /// Execute a swap against the fixture ledger and print the receipt
    Swap {
        #[command(flatten)]
        router: RouterArgs,

        /// One of: exact_tokens_for_tokens, tokens_for_exact_tokens,
        /// exact_native_for_tokens, tokens_for_exact_native,
        /// exact_tokens_for_native, native_for_exact_tokens
        #[arg(long)]
        variant: SwapVariant,

        /// Exact side: input for exact-input variants, output otherwise
        #[arg(long)]
        amount: String,

        /// Minimum output (exact-input) or maximum input (exact-output)
        #[arg(long)]
        bound: String,

        /// Comma separated symbols or addresses
        #[arg(long, value_delimiter = ',', required = true)]
        path: Vec<String>,

        /// Paying account
        #[arg(long)]
        caller: String,

        /// Receiving account
        #[arg(long)]
        to: String,

        /// Unix seconds; defaults to twenty minutes from now
        #[arg(long)]
        deadline: Option<u64>,
    },
}

/// A fixture ledger with a router on top of it.
struct Session {
    fixture: LedgerFixture,
    ledger: InMemoryLedger,
    router: SwapRouter,
    clock: Arc<SystemClock>,
}

impl Session {
    async fn open(args: &RouterArgs) -> Result<Self> {
        let fixture = LedgerFixture::load(&args.fixture)?;
        let ledger = fixture.build_ledger().await?;
        let config = router_config(&fixture, args)?;

        let shared = Arc::new(ledger.clone());
        let clock = Arc::new(SystemClock);
        let router = SwapRouter::new(config, shared.clone(), shared, clock.clone())
            .context("creating router")?;

        Ok(Self {
            fixture,
            ledger,
            router,
            clock,
        })
    }

    fn resolve_path(&self, path: &[String]) -> Result<Vec<Token>> {
        path.iter()
            .map(|entry| resolve_token(&self.fixture, entry))
            .collect()
    }

    async fn print_quote(&self, tokens: &[Token], quote: &SwapQuote) -> Result<()> {
        let mut table = Table::new();
        table.add_row(row![
            "Hop",
            "Pair",
            "Amount In",
            "Amount Out",
            "Spot Price",
            "Exec Price",
            "Impact %"
        ]);

        for (i, hop) in tokens.windows(2).enumerate() {
            let (token_in, token_out) = (&hop[0], &hop[1]);
            let (reserve_in, reserve_out) = self
                .ledger
                .get_reserves(token_in.address, token_out.address)
                .await?;

            let amount_in = token_in.format_units(quote.amounts[i])?;
            let amount_out = token_out.format_units(quote.hop_output(i))?;
            let spot = spot_price(reserve_in, reserve_out)?
                .checked_mul(decimal_shift(token_in.decimals, token_out.decimals)?)
                .ok_or_else(|| anyhow!("spot price overflow"))?;
            let exec = amount_out.checked_div(amount_in).unwrap_or_default();
            let impact = exec
                .checked_div(spot)
                .map(|ratio| (Decimal::ONE - ratio) * Decimal::ONE_HUNDRED)
                .unwrap_or_default();

            table.add_row(row![
                i + 1,
                format!("{}/{}", token_in.symbol, token_out.symbol),
                amount_in,
                amount_out,
                spot.round_dp(8),
                exec.round_dp(8),
                impact.round_dp(4)
            ]);
        }
        table.printstd();

        let (first, last) = (&tokens[0], &tokens[tokens.len() - 1]);
        println!(
            "Amount in:    {} {}",
            first.format_units(quote.amount_in())?,
            first.symbol
        );
        println!(
            "Amount out:   {} {}",
            last.format_units(quote.amount_out())?,
            last.symbol
        );
        println!(
            "Protocol fee: {} {} ({} bps)",
            last.format_units(quote.protocol_fee)?,
            last.symbol,
            self.router.quote_engine().protocol_fee().bps()
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::QuoteOut {
            router,
            amount_in,
            path,
        } => {
            let session = Session::open(router).await?;
            let tokens = session.resolve_path(path)?;
            let amount_in = tokens[0].parse_units(amount_in)?;
            let addresses = addresses(&tokens);

            let quote = session
                .router
                .quote_engine()
                .quote_exact_in(amount_in, &addresses)
                .await
                .context("quoting exact input")?;
            session.print_quote(&tokens, &quote).await?;
        }
        Commands::QuoteIn {
            router,
            amount_out,
            path,
        } => {
            let session = Session::open(router).await?;
            let tokens = session.resolve_path(path)?;
            let amount_out = tokens[tokens.len() - 1].parse_units(amount_out)?;
            let addresses = addresses(&tokens);

            let quote = session
                .router
                .quote_engine()
                .quote_exact_out(amount_out, &addresses)
                .await
                .context("quoting exact output")?;
            session.print_quote(&tokens, &quote).await?;
        }
        Commands::Swap {
            router,
            variant,
            amount,
            bound,
            path,
            caller,
            to,
            deadline,
        } => {
            let session = Session::open(router).await?;
            let tokens = session.resolve_path(path)?;
            let (token_in, token_out) = (&tokens[0], &tokens[tokens.len() - 1]);

            // The exact side and the bound are denominated in opposite ends of the path.
            let (amount, bound) = if variant.is_exact_input() {
                (token_in.parse_units(amount)?, token_out.parse_units(bound)?)
            } else {
                (token_out.parse_units(amount)?, token_in.parse_units(bound)?)
            };
            let value = match (variant.native_in(), variant.is_exact_input()) {
                (false, _) => U256::zero(),
                (true, true) => amount,
                (true, false) => bound,
            };

            let request = SwapRequest {
                variant: *variant,
                amount,
                bound,
                path: addresses(&tokens),
                caller: parse_address(caller)?,
                to: parse_address(to)?,
                deadline: deadline.unwrap_or(session.clock.now() + DEFAULT_DEADLINE_SECS),
                value,
            };
            info!(variant = %variant, hops = tokens.len() - 1, "Submitting swap");

            let receipt = session
                .router
                .execute(request)
                .await
                .with_context(|| format!("{variant} failed"))?;
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
    }

    Ok(())
}

fn addresses(tokens: &[Token]) -> Vec<Address> {
    tokens.iter().map(|t| t.address).collect()
}

/// `10^(decimals_in - decimals_out)`, turning a raw reserve ratio into a
/// price between display units.
fn decimal_shift(decimals_in: u8, decimals_out: u8) -> Result<Decimal> {
    let shift = i32::from(decimals_in) - i32::from(decimals_out);
    if shift.unsigned_abs() > MAX_DECIMAL_SCALE {
        bail!("decimal gap {shift} is too wide to display");
    }
    let factor = Decimal::new(1, shift.unsigned_abs());
    if shift > 0 {
        Decimal::ONE
            .checked_div(factor)
            .ok_or_else(|| anyhow!("decimal shift overflow"))
    } else {
        Ok(factor)
    }
}

/// Resolves a path entry given either as an address (`0x` or `0X`) or a symbol.
fn resolve_token(fixture: &LedgerFixture, entry: &str) -> Result<Token> {
    let entry = entry.trim();
    if entry
        .get(..2)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("0x"))
    {
        let address = parse_address(entry)?;
        return Ok(fixture
            .token(&address)
            .cloned()
            .unwrap_or_else(|| Token::new(address, format_address(&address), 18)));
    }
    fixture
        .token_by_symbol(entry)
        .cloned()
        .ok_or_else(|| anyhow!("unknown token symbol {entry:?}"))
}

fn router_config(fixture: &LedgerFixture, args: &RouterArgs) -> Result<RouterConfig> {
    let config = RouterConfig {
        router: address_setting(args.router.as_deref(), ENV_ROUTER)?,
        factory: optional_address(ENV_FACTORY)?.unwrap_or(fixture.factory),
        wrapped_native: optional_address(ENV_WRAPPED_NATIVE)?.unwrap_or(fixture.wrapped_native),
        fee_recipient: address_setting(args.fee_recipient.as_deref(), ENV_FEE_RECIPIENT)?,
        protocol_fee_bps: match args.fee_bps {
            Some(bps) => bps,
            None => env::var(ENV_PROTOCOL_FEE_BPS)
                .with_context(|| format!("--fee-bps or {ENV_PROTOCOL_FEE_BPS} must be set"))?
                .trim()
                .parse()
                .with_context(|| format!("parsing {ENV_PROTOCOL_FEE_BPS}"))?,
        },
    };
    config.validate()?;
    Ok(config)
}

fn address_setting(flag: Option<&str>, name: &str) -> Result<Address> {
    match flag {
        Some(value) => Ok(parse_address(value)?),
        None => match optional_address(name)? {
            Some(address) => Ok(address),
            None => bail!("{name} must be set (or passed as a flag)"),
        },
    }
}

fn optional_address(name: &str) -> Result<Option<Address>> {
    match env::var(name) {
        Ok(value) => Ok(Some(
            parse_address(&value).with_context(|| format!("parsing {name}"))?,
        )),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_shift() {
        assert_eq!(decimal_shift(18, 18).unwrap(), Decimal::ONE);
        assert_eq!(decimal_shift(18, 6).unwrap(), Decimal::from(1_000_000_000_000u64));
        assert_eq!(decimal_shift(6, 8).unwrap(), Decimal::new(1, 2));
        assert!(decimal_shift(0, 40).is_err());
    }

    #[test]
    fn test_resolve_token_by_address_or_symbol() {
        let weth = parse_address("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2").unwrap();
        let fixture = LedgerFixture {
            factory: parse_address("0x5c69bee701ef814a2b6a3edd4b1652cb9cc5aa6f").unwrap(),
            wrapped_native: weth,
            tokens: vec![Token::new(weth, "WETH", 18)],
            pairs: vec![],
            balances: vec![],
        };

        let upper = resolve_token(&fixture, "0XC02AAA39B223FE8D0A0E5C4F27EAD9083C756CC2").unwrap();
        assert_eq!(upper.address, weth);
        assert_eq!(upper.symbol, "WETH");

        let lower =
            resolve_token(&fixture, " 0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2 ").unwrap();
        assert_eq!(lower.address, weth);

        assert_eq!(resolve_token(&fixture, "weth").unwrap().address, weth);

        // Unknown addresses still resolve, with 18 decimals.
        let other = resolve_token(&fixture, "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984").unwrap();
        assert_eq!(other.decimals, 18);
        assert_eq!(other.symbol, "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984");

        assert!(resolve_token(&fixture, "DAI").is_err());
    }

    #[test]
    fn test_cli_parses_swap() {
        let cli = Cli::try_parse_from([
            "cp-router",
            "swap",
            "--variant",
            "exact_native_for_tokens",
            "--amount",
            "0.01",
            "--bound",
            "0",
            "--path",
            "WETH,UNI",
            "--caller",
            "0x6cc5f688a315f3dc28a7781717a9a798a59fda7b",
            "--to",
            "0x6cc5f688a315f3dc28a7781717a9a798a59fda7b",
        ])
        .unwrap();

        match cli.command {
            Commands::Swap { variant, path, .. } => {
                assert_eq!(variant, SwapVariant::ExactNativeForTokens);
                assert_eq!(path, vec!["WETH".to_string(), "UNI".to_string()]);
            }
            _ => panic!("expected swap"),
        }
    }
}
