//! GamblePro command-line client

use async_trait::async_trait;
use clap::{Parser, Subcommand, ValueEnum};
use gamblepro::{
    api::models::{CheckoutRequest, PaymentConfirmation, ProfileUpdate},
    common::{traits::CheckoutWidget, types::format_inr},
    config::{generate_sample_config, ClientConfig, ConfigLoader, LogLevel},
    dashboard::Dashboard,
    display,
    errors::{ClientError, ClientResult, ValidationError},
    games::{
        catalogue,
        types::{BetSelection, BetStatus, CoinChoice, DiceBet, GameType, RouletteBet, Wager},
        BetFlowController, BetOutcome,
    },
    history::{load_history, HistoryFilter},
    services::ServiceContainer,
    wallet::{WalletFlow, WalletTab, WithdrawalForm},
};
use rand::{rngs::StdRng, SeedableRng};
use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "./gamblepro.toml";
const RECENT_BETS: u32 = 5;

/// GamblePro CLI
#[derive(Parser)]
#[command(name = "gamblepro")]
#[command(about = "Play and manage your GamblePro account from the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API base URL (overrides config and GAMBLEPRO_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },

    /// Log in and store the session token
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show or update the profile
    Profile {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },

    /// List available games
    Games {
        /// Filter by name
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Bet on heads or tails
    Coinflip {
        #[arg(value_enum)]
        choice: CoinArg,
        /// Stake; defaults to the first quick amount
        #[arg(short, long)]
        amount: Option<f64>,
    },

    /// Bet on a die roll
    Dice {
        #[arg(value_enum)]
        bet: DiceArg,
        /// Face for an exact bet (1-6)
        #[arg(short, long, required_if_eq("bet", "exact"))]
        number: Option<u8>,
        /// Stake; defaults to the first quick amount
        #[arg(short, long)]
        amount: Option<f64>,
    },

    /// Bet on the roulette wheel
    Roulette {
        #[arg(value_enum)]
        bet: RouletteArg,
        /// Pocket for a straight bet (0-36)
        #[arg(short, long, required_if_eq("bet", "straight"))]
        number: Option<u8>,
        /// Stake; defaults to the first quick amount
        #[arg(short, long)]
        amount: Option<f64>,
    },

    /// Spin the slot machine
    Slots {
        /// Stake; defaults to the first quick amount
        #[arg(short, long)]
        amount: Option<f64>,
    },

    /// Browse bet history
    History {
        #[arg(short, long)]
        game: Option<GameType>,
        #[arg(short, long)]
        status: Option<BetStatus>,
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Show balance, transactions and bonuses
    Wallet {
        #[arg(short, long, default_value = "all")]
        tab: WalletTab,
    },

    /// Add funds through the payment checkout
    Deposit { amount: f64 },

    /// Withdraw to a UPI id or bank account
    Withdraw {
        amount: f64,
        #[arg(long, conflicts_with_all = ["account_number", "ifsc_code", "account_name"])]
        upi: Option<String>,
        #[arg(long)]
        account_number: Option<String>,
        #[arg(long)]
        ifsc_code: Option<String>,
        #[arg(long)]
        account_name: Option<String>,
    },

    /// Stats, 7-day chart and recent activity
    Dashboard,

    /// Configuration helpers
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a sample configuration file
    Init {
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        output: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CoinArg {
    Heads,
    Tails,
}

#[derive(Clone, Copy, ValueEnum)]
enum DiceArg {
    High,
    Low,
    Exact,
}

#[derive(Clone, Copy, ValueEnum)]
enum RouletteArg {
    Red,
    Black,
    Green,
    Even,
    Odd,
    Low,
    High,
    Straight,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Commands::Config {
        action: ConfigAction::Init { output, force },
    } = &cli.command
    {
        return write_sample_config(output, *force);
    }

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let mut config = ConfigLoader::new().with_path(&config_path).load()?;
    if let Some(url) = cli.api_url.clone() {
        config.api.base_url = url;
    }
    init_logging(&config, cli.verbose);

    let services = ServiceContainer::new(config)?;
    let session = services.session();
    session.restore().await?;
    if let Some(error) = session.last_error() {
        println!("⚠️  {}", error);
    }

    if let Err(e) = run(cli.command, &services).await {
        if e.is_unauthorized() {
            eprintln!("🔒 Your session is no longer valid. Run `gamblepro login` again.");
        }
        return Err(e.into());
    }
    Ok(())
}

async fn run(command: Commands, services: &ServiceContainer) -> ClientResult<()> {
    let session = services.session();
    match command {
        Commands::Register {
            username,
            email,
            password,
        } => {
            let user = session.register(&username, &email, &password).await?;
            println!("✅ Welcome, {}! Balance: {}", user.username, format_inr(user.balance));
        }
        Commands::Login { email, password } => {
            let user = session.login(&email, &password).await?;
            println!("✅ Logged in as {}. Balance: {}", user.username, format_inr(user.balance));
        }
        Commands::Logout => {
            session.logout();
            println!("👋 Logged out");
        }
        Commands::Profile { username, email } => {
            let user = if username.is_some() || email.is_some() {
                session.update_profile(&ProfileUpdate { username, email }).await?
            } else {
                session.user().ok_or(ClientError::AuthRequired)?
            };
            println!("Username: {}", user.username);
            println!("Email:    {}", user.email);
            println!("Balance:  {}", format_inr(user.balance));
        }
        Commands::Games { search } => {
            let games = services.games().games().await?;
            let listings = catalogue::enrich(&games, services.config().games.min_bet);
            for listing in listings.iter().filter(|l| l.matches(&search)) {
                println!("{}", display::listing_line(listing));
            }
        }
        Commands::Coinflip { choice, amount } => {
            let choice = match choice {
                CoinArg::Heads => CoinChoice::Heads,
                CoinArg::Tails => CoinChoice::Tails,
            };
            let wager = Wager::new(stake(services, amount), BetSelection::CoinFlip(choice));
            play(services, wager).await?;
        }
        Commands::Dice { bet, number, amount } => {
            let bet = match bet {
                DiceArg::High => DiceBet::High,
                DiceArg::Low => DiceBet::Low,
                DiceArg::Exact => DiceBet::Exact {
                    number: number.unwrap_or_default(),
                },
            };
            let wager = Wager::new(stake(services, amount), BetSelection::DiceRoll(bet));
            play(services, wager).await?;
        }
        Commands::Roulette { bet, number, amount } => {
            let bet = match bet {
                RouletteArg::Red => RouletteBet::Red,
                RouletteArg::Black => RouletteBet::Black,
                RouletteArg::Green => RouletteBet::Green,
                RouletteArg::Even => RouletteBet::Even,
                RouletteArg::Odd => RouletteBet::Odd,
                RouletteArg::Low => RouletteBet::Low,
                RouletteArg::High => RouletteBet::High,
                RouletteArg::Straight => RouletteBet::Straight {
                    number: number.unwrap_or_default(),
                },
            };
            let wager = Wager::new(stake(services, amount), BetSelection::Roulette(bet));
            play(services, wager).await?;
        }
        Commands::Slots { amount } => {
            let wager = Wager::new(stake(services, amount), BetSelection::Slots);
            play(services, wager).await?;
        }
        Commands::History { game, status, page } => {
            require_login(services)?;
            let filter = HistoryFilter::default()
                .with_game(game)
                .with_status(status)
                .with_page(page);
            let history = load_history(services.games(), &filter).await?;
            if history.bets.is_empty() {
                println!("No bets found");
            }
            for bet in &history.bets {
                println!("{}", display::bet_line(bet));
            }
            println!(
                "Page {} of {} ({} bets)",
                history.page,
                history.total_pages().max(1),
                history.total
            );
        }
        Commands::Wallet { tab } => {
            let wallet = WalletFlow::from_container(services, Arc::new(TerminalCheckout));
            let summary = wallet.summary().await?;
            println!("💰 Balance: {}", format_inr(session.balance()));
            println!("\nTransactions ({}):", tab);
            for tx in summary.tab(tab) {
                println!("  {}", display::transaction_line(tx));
            }
            println!("\nBonuses:");
            for bonus in &summary.bonuses {
                println!("  {}", display::bonus_line(bonus));
            }
        }
        Commands::Deposit { amount } => {
            let wallet = WalletFlow::from_container(services, Arc::new(TerminalCheckout));
            wallet.deposit(amount).await?;
            println!("💰 Balance: {}", format_inr(session.balance()));
        }
        Commands::Withdraw {
            amount,
            upi,
            account_number,
            ifsc_code,
            account_name,
        } => {
            let form = match upi {
                Some(upi_id) => WithdrawalForm::Upi { upi_id },
                None => WithdrawalForm::Bank {
                    account_number: account_number.unwrap_or_default(),
                    ifsc_code: ifsc_code.unwrap_or_default(),
                    account_name: account_name.unwrap_or_default(),
                },
            };
            let wallet = WalletFlow::from_container(services, Arc::new(TerminalCheckout));
            wallet.withdraw(amount, form).await?;
            println!("💰 Balance: {}", format_inr(session.balance()));
        }
        Commands::Dashboard => {
            require_login(services)?;
            let dashboard = Dashboard::load(services.games(), services.wallet()).await?;
            println!("📊 Dashboard");
            println!("============");
            for line in display::stats_lines(&dashboard.stats) {
                println!("{}", line);
            }
            println!("\nLast 7 days:");
            let series = dashboard.chart(chrono::Utc::now().date_naive());
            for line in display::chart_lines(&series, 20) {
                println!("  {}", line);
            }
            println!("\nRecent bets:");
            for bet in &dashboard.bets {
                println!("  {}", display::bet_line(bet));
            }
            println!("\nRecent transactions:");
            for tx in &dashboard.transactions {
                println!("  {}", display::transaction_line(tx));
            }
        }
        Commands::Config { .. } => {}
    }
    Ok(())
}

fn init_logging(config: &ClientConfig, verbose: bool) {
    let level = if verbose {
        LogLevel::Debug
    } else {
        config.logging.level
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| level.filter_directive().into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Explicit stake, or the first configured quick amount
fn stake(services: &ServiceContainer, amount: Option<f64>) -> f64 {
    let games = &services.config().games;
    amount.unwrap_or_else(|| {
        println!("{}", display::quick_amounts_line(&games.quick_amounts));
        games.quick_amounts.first().copied().unwrap_or(games.min_bet)
    })
}

fn require_login(services: &ServiceContainer) -> ClientResult<()> {
    if services.session().is_authenticated() {
        Ok(())
    } else {
        Err(ClientError::AuthRequired)
    }
}

fn write_sample_config(output: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if output.exists() && !force {
        let message = format!("{} already exists (use --force to overwrite)", output.display());
        return Err(message.into());
    }
    std::fs::write(output, generate_sample_config())?;
    println!("✅ Sample configuration written to {}", output.display());
    Ok(())
}

/// Place one wager, animating until the result is revealed
async fn play(services: &ServiceContainer, wager: Wager) -> ClientResult<()> {
    let game = wager.game_type();
    println!("{}", display::stake_line(&wager));
    let controller = BetFlowController::from_container(game, services);
    let mut states = controller.subscribe();

    let spinner = tokio::spawn(async move {
        let mut rng = StdRng::from_entropy();
        let mut ticker = tokio::time::interval(Duration::from_millis(100));
        let mut shown = false;
        loop {
            tokio::select! {
                changed = states.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {}
            }
            let (busy, done) = {
                let state = states.borrow();
                (state.is_busy(), state.is_terminal())
            };
            if done {
                break;
            }
            if busy {
                let frame = match game {
                    GameType::Slots => display::spinner_frame(&mut rng),
                    other => display::pending_label(other).to_string(),
                };
                print!("\r\x1b[2K{}", frame);
                let _ = std::io::stdout().flush();
                shown = true;
            }
        }
        if shown {
            print!("\r\x1b[2K");
            let _ = std::io::stdout().flush();
        }
    });

    let outcome = controller.place_bet(wager).await;
    drop(controller);
    let _ = spinner.await;

    match outcome? {
        BetOutcome::Settled(settled) => {
            println!("{}", display::render_settled(&settled));
            println!("💰 Balance: {}", format_inr(services.session().balance()));
            match services.games().recent_bets(game, RECENT_BETS).await {
                Ok(bets) if !bets.is_empty() => {
                    println!("\nYour recent {} bets:", game.title());
                    for bet in &bets {
                        println!("  {}", display::bet_line(bet));
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Could not load recent bets"),
            }
        }
        BetOutcome::Ignored | BetOutcome::Detached => {}
    }
    Ok(())
}

/// Checkout handled out of band: the order is shown and the payment
/// confirmation is read back from the terminal
struct TerminalCheckout;

#[async_trait]
impl CheckoutWidget for TerminalCheckout {
    async fn open(&self, checkout: CheckoutRequest) -> ClientResult<PaymentConfirmation> {
        println!("🧾 {} - {}", checkout.merchant_name, checkout.description);
        println!("   Order:    {}", checkout.order_id);
        println!(
            "   Amount:   {} ({} {} minor units)",
            format_inr(checkout.amount_minor as f64 / 100.0),
            checkout.amount_minor,
            checkout.currency
        );
        if let Some(key) = &checkout.key {
            println!("   Key:      {}", key);
        }
        println!("Complete the payment, then enter the confirmation details.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let payment_id = read_field("Payment id", &mut lines).await?;
        let signature = read_field("Signature", &mut lines).await?;

        Ok(PaymentConfirmation {
            razorpay_payment_id: payment_id,
            razorpay_order_id: checkout.order_id,
            razorpay_signature: signature,
        })
    }
}

async fn read_field<R>(label: &str, lines: &mut tokio::io::Lines<R>) -> ClientResult<String>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    print!("{}: ", label);
    let _ = std::io::stdout().flush();
    match lines.next_line().await? {
        Some(line) if !line.trim().is_empty() => Ok(line.trim().to_string()),
        _ => Err(ValidationError::MissingField("payment cancelled".to_string()).into()),
    }
}
