//! Wallet flows
//!
//! Deposits go through an external checkout widget: the server creates a
//! payment order, the widget collects the payment and its confirmation
//! is sent back for verification. Withdrawals are validated locally
//! before the request is made. Both refresh the session balance on
//! success.

use crate::{
    api::models::{AccountDetails, CheckoutRequest, DepositVerification, TransactionsQuery},
    common::{
        traits::{CheckoutWidget, Notifier},
        types::{Bonus, Transaction, TransactionType, User},
    },
    config::WalletConfig,
    errors::{ClientError, ClientResult, ValidationError},
    notify::Notification,
    services::{ServiceContainer, WalletService},
    session::SessionStore,
};
use std::{fmt, str::FromStr, sync::Arc};
use tracing::{info, warn};

/// Withdrawal destination as typed into the form, before validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawalForm {
    Upi {
        upi_id: String,
    },
    Bank {
        account_number: String,
        ifsc_code: String,
        account_name: String,
    },
}

impl WithdrawalForm {
    /// Trimmed account details; every field must be non-empty
    pub fn into_account_details(self) -> Result<AccountDetails, ValidationError> {
        match self {
            WithdrawalForm::Upi { upi_id } => {
                let upi_id = upi_id.trim().to_string();
                if upi_id.is_empty() {
                    return Err(ValidationError::MissingField(
                        "Please enter your UPI ID".to_string(),
                    ));
                }
                Ok(AccountDetails::Upi { upi_id })
            }
            WithdrawalForm::Bank {
                account_number,
                ifsc_code,
                account_name,
            } => {
                let (account_number, ifsc_code, account_name) = (
                    account_number.trim().to_string(),
                    ifsc_code.trim().to_string(),
                    account_name.trim().to_string(),
                );
                if account_number.is_empty() || ifsc_code.is_empty() || account_name.is_empty() {
                    return Err(ValidationError::MissingField(
                        "Please fill in all bank account details".to_string(),
                    ));
                }
                Ok(AccountDetails::Bank {
                    account_number,
                    ifsc_code,
                    account_name,
                })
            }
        }
    }
}

/// Ledger filter tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalletTab {
    #[default]
    All,
    Deposits,
    Withdrawals,
    /// Stakes and winnings
    Bets,
    Bonuses,
}

impl WalletTab {
    pub const ALL: [WalletTab; 5] = [
        WalletTab::All,
        WalletTab::Deposits,
        WalletTab::Withdrawals,
        WalletTab::Bets,
        WalletTab::Bonuses,
    ];

    pub fn includes(&self, tx_type: TransactionType) -> bool {
        match self {
            WalletTab::All => true,
            WalletTab::Deposits => tx_type == TransactionType::Deposit,
            WalletTab::Withdrawals => tx_type == TransactionType::Withdrawal,
            WalletTab::Bets => matches!(tx_type, TransactionType::Bet | TransactionType::Win),
            WalletTab::Bonuses => tx_type == TransactionType::Bonus,
        }
    }
}

impl fmt::Display for WalletTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WalletTab::All => "all",
            WalletTab::Deposits => "deposits",
            WalletTab::Withdrawals => "withdrawals",
            WalletTab::Bets => "bets",
            WalletTab::Bonuses => "bonuses",
        };
        f.write_str(name)
    }
}

impl FromStr for WalletTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WalletTab::ALL
            .into_iter()
            .find(|tab| tab.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown tab '{}'", s))
    }
}

/// Recent ledger entries and bonuses
#[derive(Debug, Clone, Default)]
pub struct WalletSummary {
    pub transactions: Vec<Transaction>,
    pub bonuses: Vec<Bonus>,
}

impl WalletSummary {
    pub fn tab(&self, tab: WalletTab) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|t| tab.includes(t.tx_type))
            .collect()
    }
}

pub struct WalletFlow {
    wallet: WalletService,
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    checkout: Arc<dyn CheckoutWidget>,
    config: WalletConfig,
}

impl WalletFlow {
    pub fn new(
        wallet: WalletService,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
        checkout: Arc<dyn CheckoutWidget>,
        config: WalletConfig,
    ) -> Self {
        Self {
            wallet,
            session,
            notifier,
            checkout,
            config,
        }
    }

    pub fn from_container(services: &ServiceContainer, checkout: Arc<dyn CheckoutWidget>) -> Self {
        Self::new(
            services.wallet().clone(),
            services.session(),
            services.notifier(),
            checkout,
            services.config().wallet.clone(),
        )
    }

    /// Add funds: create an order, run the checkout, verify the payment
    pub async fn deposit(&self, amount: f64) -> ClientResult<serde_json::Value> {
        let user = self.require_user()?;
        if let Err(e) = check_minimum(amount, "deposit", self.config.min_deposit) {
            self.notifier
                .notify(Notification::error("Invalid amount", e.to_string()));
            return Err(e.into());
        }

        let order = match self.wallet.create_deposit_order(amount).await {
            Ok(order) => order,
            Err(e) => {
                self.notify_failure("Deposit failed", &e, "Could not process deposit");
                return Err(e);
            }
        };
        info!(order_id = %order.id, amount, "Deposit order created");

        let checkout = CheckoutRequest {
            key: self.config.checkout_key.clone(),
            order_id: order.id.clone(),
            amount_minor: (order.amount * 100.0).round() as u64,
            currency: order.currency.clone(),
            merchant_name: self.config.merchant_name.clone(),
            description: "Deposit funds".to_string(),
            prefill_email: Some(user.email).filter(|e| !e.is_empty()),
        };
        let confirmation = match self.checkout.open(checkout).await {
            Ok(confirmation) => confirmation,
            Err(e) => {
                self.notify_failure("Deposit failed", &e, "Could not process deposit");
                return Err(e);
            }
        };

        let verification = DepositVerification {
            confirmation,
            amount,
        };
        let response = match self.wallet.verify_deposit(&verification).await {
            Ok(response) => response,
            Err(e) => {
                self.notify_failure("Payment verification failed", &e, "Could not verify payment");
                return Err(e);
            }
        };

        info!(order_id = %order.id, amount, "Deposit verified");
        self.notifier.notify(Notification::success(
            "Deposit successful",
            format!("₹{} has been added to your account!", amount),
        ));
        self.session.refresh_balance().await;
        Ok(response)
    }

    /// Request a payout to a UPI id or bank account
    pub async fn withdraw(&self, amount: f64, form: WithdrawalForm) -> ClientResult<()> {
        self.require_user()?;
        if let Err(e) = check_minimum(amount, "withdrawal", self.config.min_withdrawal) {
            self.notifier
                .notify(Notification::error("Invalid amount", e.to_string()));
            return Err(e.into());
        }
        let available = self.session.balance();
        if amount > available {
            self.notifier.notify(Notification::error(
                "Insufficient balance",
                "You don't have enough funds to withdraw this amount",
            ));
            return Err(ClientError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        let details = match form.into_account_details() {
            Ok(details) => details,
            Err(e) => {
                let description = match &e {
                    ValidationError::MissingField(message) => message.clone(),
                    other => other.to_string(),
                };
                self.notifier
                    .notify(Notification::error("Missing details", description));
                return Err(e.into());
            }
        };

        if let Err(e) = self.wallet.request_withdrawal(amount, details).await {
            self.notify_failure("Withdrawal failed", &e, "Could not process withdrawal");
            return Err(e);
        }

        info!(amount, "Withdrawal requested");
        self.notifier.notify(Notification::success(
            "Withdrawal requested",
            "Your withdrawal request has been submitted successfully",
        ));
        self.session.refresh_balance().await;
        Ok(())
    }

    /// First ledger page and all bonuses, fetched together
    pub async fn summary(&self) -> ClientResult<WalletSummary> {
        self.require_user()?;
        let query = TransactionsQuery::default();
        let (transactions, bonuses) =
            tokio::try_join!(self.wallet.transactions(&query), self.wallet.bonuses())?;
        Ok(WalletSummary {
            transactions: transactions.transactions,
            bonuses: bonuses.bonuses,
        })
    }

    fn require_user(&self) -> ClientResult<User> {
        self.session.user().ok_or_else(|| {
            self.notifier.notify(Notification::wallet_auth_required());
            ClientError::AuthRequired
        })
    }

    fn notify_failure(&self, title: &str, error: &ClientError, fallback: &str) {
        warn!(error = %error, "{}", title);
        self.notifier
            .notify(Notification::error(title, error.user_message(fallback)));
    }
}

fn check_minimum(amount: f64, what: &'static str, minimum: f64) -> Result<(), ValidationError> {
    if !amount.is_finite() || amount < minimum {
        return Err(ValidationError::BelowMinimum { what, minimum });
    }
    Ok(())
}
