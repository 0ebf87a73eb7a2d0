//! Bet-flow controller
//!
//! One controller per game view. It sequences a wager through local
//! pre-checks, a single placement request and a delayed reveal:
//!
//! ```text
//! Idle -> Validating -> Rejected
//!                    -> Submitting -> Failed
//!                                  -> PendingReveal -> Settled
//! ```
//!
//! The reveal time is fixed when the request is sent, so a fast response
//! is still held back until the game's reveal floor has elapsed. After
//! settlement the session balance is refreshed exactly once.

use super::types::{GameType, SettledBet, Wager};
use crate::{
    common::traits::Notifier,
    config::ClientConfig,
    errors::{ClientError, ClientResult, ValidationError},
    notify::Notification,
    services::{GamesService, ServiceContainer},
    session::SessionStore,
};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{sync::watch, time::Instant};
use tracing::{debug, info, warn};

const PLACEMENT_FAILED: &str = "Failed to place bet";

/// Where a controller is in the bet lifecycle
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FlowState {
    #[default]
    Idle,
    Validating,
    /// Local pre-check failed; nothing was sent
    Rejected { reason: String },
    Submitting,
    /// Result received, held until the reveal time
    PendingReveal,
    Settled(SettledBet),
    Failed { message: String },
}

impl FlowState {
    /// A wager is in flight; new submissions are ignored
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            FlowState::Validating | FlowState::Submitting | FlowState::PendingReveal
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FlowState::Rejected { .. } | FlowState::Settled(_) | FlowState::Failed { .. }
        )
    }
}

/// What a call to [`BetFlowController::place_bet`] ended with
#[derive(Debug, Clone, PartialEq)]
pub enum BetOutcome {
    Settled(SettledBet),
    /// Another wager was still in flight
    Ignored,
    /// The controller was detached before the result could be shown
    Detached,
}

type SettledCallback = Box<dyn Fn(&SettledBet) + Send + Sync>;

pub struct BetFlowController {
    game: GameType,
    games: GamesService,
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    reveal_floor: Duration,
    min_bet: f64,
    state: watch::Sender<FlowState>,
    detached: AtomicBool,
    on_settled: Option<SettledCallback>,
}

impl BetFlowController {
    pub fn new(
        game: GameType,
        config: &ClientConfig,
        games: GamesService,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (state, _) = watch::channel(FlowState::Idle);
        Self {
            game,
            games,
            session,
            notifier,
            reveal_floor: config.reveal_floor(game),
            min_bet: config.games.min_bet,
            state,
            detached: AtomicBool::new(false),
            on_settled: None,
        }
    }

    pub fn from_container(game: GameType, services: &ServiceContainer) -> Self {
        Self::new(
            game,
            services.config(),
            services.games().clone(),
            services.session(),
            services.notifier(),
        )
    }

    /// Invoked after every settlement, once the balance refresh is done
    pub fn on_settled(mut self, callback: impl Fn(&SettledBet) + Send + Sync + 'static) -> Self {
        self.on_settled = Some(Box::new(callback));
        self
    }

    pub fn game(&self) -> GameType {
        self.game
    }

    pub fn reveal_floor(&self) -> Duration {
        self.reveal_floor
    }

    pub fn state(&self) -> FlowState {
        self.state.borrow().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.state.borrow().is_busy()
    }

    pub fn subscribe(&self) -> watch::Receiver<FlowState> {
        self.state.subscribe()
    }

    /// Stop all further state updates and side effects. In-flight
    /// requests are not cancelled; their results are dropped.
    pub fn detach(&self) {
        self.detached.store(true, Ordering::SeqCst);
        debug!(game = %self.game, "Bet flow detached");
    }

    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }

    /// Return to `Idle` from a terminal state
    pub fn reset(&self) {
        self.state.send_if_modified(|state| {
            if state.is_terminal() {
                *state = FlowState::Idle;
                true
            } else {
                false
            }
        });
    }

    /// Run one wager through the full flow.
    ///
    /// Local rejections and placement failures are reported through the
    /// notifier and returned as errors. A call made while another wager is
    /// in flight returns [`BetOutcome::Ignored`] without side effects.
    pub async fn place_bet(&self, wager: Wager) -> ClientResult<BetOutcome> {
        if self.is_detached() {
            return Ok(BetOutcome::Detached);
        }

        let accepted = self.state.send_if_modified(|state| {
            if state.is_busy() {
                false
            } else {
                *state = FlowState::Validating;
                true
            }
        });
        if !accepted {
            debug!(game = %self.game, "Bet already in flight, ignoring");
            return Ok(BetOutcome::Ignored);
        }

        if let Err(e) = self.precheck(&wager) {
            let notice = match &e {
                ClientError::AuthRequired => Notification::auth_required(),
                ClientError::InsufficientBalance { .. } => Notification::insufficient_balance(),
                other => Notification::error("Invalid bet", other.user_message(PLACEMENT_FAILED)),
            };
            self.notifier.notify(notice);
            self.transition(FlowState::Rejected {
                reason: e.to_string(),
            });
            return Err(e);
        }

        let reveal_at = Instant::now() + self.reveal_floor;
        self.transition(FlowState::Submitting);
        info!(
            game = %self.game,
            amount = wager.amount,
            selection = %wager.selection,
            "Placing bet"
        );

        let response = match self.games.place_bet(&wager).await {
            Ok(response) => response,
            Err(e) => {
                if self.is_detached() {
                    return Ok(BetOutcome::Detached);
                }
                let message = e.user_message(PLACEMENT_FAILED);
                warn!(game = %self.game, error = %e, "Bet placement failed");
                self.transition(FlowState::Failed {
                    message: message.clone(),
                });
                self.notifier
                    .notify(Notification::error("Error placing bet", message));
                return Err(e);
            }
        };

        if self.is_detached() {
            return Ok(BetOutcome::Detached);
        }
        self.transition(FlowState::PendingReveal);
        tokio::time::sleep_until(reveal_at).await;
        if self.is_detached() {
            return Ok(BetOutcome::Detached);
        }

        let settled = SettledBet {
            wager,
            bet: response.bet,
            details: response.game_details,
        };
        info!(
            game = %self.game,
            bet_id = %settled.bet.id,
            won = settled.won(),
            payout = settled.payout(),
            "Bet settled"
        );
        self.transition(FlowState::Settled(settled.clone()));
        self.notifier.notify(if settled.won() {
            Notification::bet_won(settled.payout())
        } else {
            Notification::bet_lost(self.game == GameType::Slots)
        });

        self.session.refresh_balance().await;
        if self.is_detached() {
            return Ok(BetOutcome::Settled(settled));
        }
        if let Some(callback) = &self.on_settled {
            callback(&settled);
        }

        Ok(BetOutcome::Settled(settled))
    }

    fn precheck(&self, wager: &Wager) -> ClientResult<()> {
        if !self.session.is_authenticated() {
            return Err(ClientError::AuthRequired);
        }
        if wager.game_type() != self.game {
            return Err(ValidationError::InvalidSelection(format!(
                "{} bet placed on the {} table",
                wager.game_type(),
                self.game
            ))
            .into());
        }
        if !wager.amount.is_finite() || wager.amount <= 0.0 {
            return Err(ValidationError::InvalidAmount(
                "amount must be a positive number".to_string(),
            )
            .into());
        }
        if wager.amount < self.min_bet {
            return Err(ValidationError::BelowMinimum {
                what: "bet",
                minimum: self.min_bet,
            }
            .into());
        }
        wager.selection.validate()?;

        let available = self.session.balance();
        if wager.amount > available {
            return Err(ClientError::InsufficientBalance {
                requested: wager.amount,
                available,
            });
        }
        Ok(())
    }

    fn transition(&self, next: FlowState) {
        if self.is_detached() {
            return;
        }
        self.state.send_replace(next);
    }
}
