//! Domain services and dependency wiring
//!
//! `AuthService`, `GamesService` and `WalletService` translate UI intents
//! into API calls over a shared [`Transport`]. [`ServiceContainer`] builds
//! the whole client (credential store, transport, services, session) from
//! a [`ClientConfig`].

use crate::{
    api::{models::*, ApiClient, ApiRequest},
    common::{
        traits::{Notifier, TokenStore, Transport},
        types::User,
    },
    config::ClientConfig,
    errors::ClientResult,
    games::types::{Bet, GameType, Wager},
    notify::TracingNotifier,
    session::{FileTokenStore, SessionStore},
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Decode a JSON response body into a typed model
fn decode<T: DeserializeOwned>(value: serde_json::Value) -> ClientResult<T> {
    Ok(serde_json::from_value(value)?)
}

/// Account endpoints
#[derive(Clone)]
pub struct AuthService {
    transport: Arc<dyn Transport>,
}

impl AuthService {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<AuthResponse> {
        let body = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        decode(self.transport.send(ApiRequest::post("/users/register", &body)?).await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<AuthResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        decode(self.transport.send(ApiRequest::post("/users/login", &body)?).await?)
    }

    pub async fn profile(&self) -> ClientResult<User> {
        let response: ProfileResponse =
            decode(self.transport.send(ApiRequest::get("/users/profile")).await?)?;
        Ok(response.user)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<User> {
        let response: ProfileResponse =
            decode(self.transport.send(ApiRequest::put("/users/profile", update)?).await?)?;
        Ok(response.user)
    }
}

/// Game catalogue, bet placement and history
#[derive(Clone)]
pub struct GamesService {
    transport: Arc<dyn Transport>,
}

impl GamesService {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn games(&self) -> ClientResult<Vec<GameInfo>> {
        let response: GamesResponse =
            decode(self.transport.send(ApiRequest::get("/bets/games")).await?)?;
        Ok(response.games)
    }

    /// Submit a wager; the response carries the already-settled bet
    pub async fn place_bet(&self, wager: &Wager) -> ClientResult<PlaceBetResponse> {
        let body = PlaceBetRequest {
            game_type: wager.game_type(),
            amount: wager.amount,
            bet_details: wager.selection.bet_details(),
        };
        decode(self.transport.send(ApiRequest::post("/bets", &body)?).await?)
    }

    pub async fn bet_history(&self, query: &BetHistoryQuery) -> ClientResult<BetHistoryResponse> {
        let request = ApiRequest::get("/bets").with_query(query.to_query());
        decode(self.transport.send(request).await?)
    }

    /// History page for one game, as reloaded by a game view
    pub async fn recent_bets(&self, game_type: GameType, limit: u32) -> ClientResult<Vec<Bet>> {
        let query = BetHistoryQuery {
            limit,
            game_type: Some(game_type),
            ..Default::default()
        };
        Ok(self.bet_history(&query).await?.bets)
    }
}

/// Deposits, withdrawals, ledger and bonuses
#[derive(Clone)]
pub struct WalletService {
    transport: Arc<dyn Transport>,
}

impl WalletService {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn create_deposit_order(&self, amount: f64) -> ClientResult<DepositOrder> {
        let body = DepositOrderRequest { amount };
        let request = ApiRequest::post("/transactions/deposit/create", &body)?;
        let response: CreateDepositResponse = decode(self.transport.send(request).await?)?;
        Ok(response.order)
    }

    pub async fn verify_deposit(
        &self,
        verification: &DepositVerification,
    ) -> ClientResult<serde_json::Value> {
        self.transport
            .send(ApiRequest::post("/transactions/deposit/verify", verification)?)
            .await
    }

    pub async fn request_withdrawal(
        &self,
        amount: f64,
        account_details: AccountDetails,
    ) -> ClientResult<serde_json::Value> {
        let body = WithdrawalRequest {
            amount,
            account_details,
        };
        self.transport
            .send(ApiRequest::post("/transactions/withdrawal", &body)?)
            .await
    }

    pub async fn transactions(
        &self,
        query: &TransactionsQuery,
    ) -> ClientResult<TransactionsResponse> {
        let request = ApiRequest::get("/transactions").with_query(query.to_query());
        decode(self.transport.send(request).await?)
    }

    pub async fn bonuses(&self) -> ClientResult<BonusesResponse> {
        decode(self.transport.send(ApiRequest::get("/bonuses/my-bonuses")).await?)
    }
}

/// Service container for dependency injection
pub struct ServiceContainer {
    config: ClientConfig,
    tokens: Arc<dyn TokenStore>,
    notifier: Arc<dyn Notifier>,
    auth: AuthService,
    games: GamesService,
    wallet: WalletService,
    session: Arc<SessionStore>,
}

impl ServiceContainer {
    /// Wire the production collaborators described by `config`
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        ServiceBuilder::new(config).build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn tokens(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.tokens)
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::clone(&self.notifier)
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn games(&self) -> &GamesService {
        &self.games
    }

    pub fn wallet(&self) -> &WalletService {
        &self.wallet
    }

    pub fn session(&self) -> Arc<SessionStore> {
        Arc::clone(&self.session)
    }
}

/// Builder for service containers with overridable collaborators
pub struct ServiceBuilder {
    config: ClientConfig,
    tokens_override: Option<Arc<dyn TokenStore>>,
    transport_override: Option<Arc<dyn Transport>>,
    notifier_override: Option<Arc<dyn Notifier>>,
}

impl ServiceBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            tokens_override: None,
            transport_override: None,
            notifier_override: None,
        }
    }

    pub fn with_tokens(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens_override = Some(tokens);
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport_override = Some(transport);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier_override = Some(notifier);
        self
    }

    pub fn build(self) -> ClientResult<ServiceContainer> {
        self.config.validate()?;

        let tokens: Arc<dyn TokenStore> = match self.tokens_override {
            Some(tokens) => tokens,
            None => Arc::new(FileTokenStore::new(
                &self.config.session.token_path,
                &self.config.session.token_key,
            )),
        };
        let transport: Arc<dyn Transport> = match self.transport_override {
            Some(transport) => transport,
            None => Arc::new(ApiClient::new(&self.config.api, Arc::clone(&tokens))?),
        };
        let notifier: Arc<dyn Notifier> = self
            .notifier_override
            .unwrap_or_else(|| Arc::new(TracingNotifier));

        let auth = AuthService::new(Arc::clone(&transport));
        let session = Arc::new(SessionStore::new(auth.clone(), Arc::clone(&tokens)));

        Ok(ServiceContainer {
            config: self.config,
            tokens,
            notifier,
            auth,
            games: GamesService::new(Arc::clone(&transport)),
            wallet: WalletService::new(transport),
            session,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::games::types::{BetSelection, DiceBet};
    use crate::testing::ScriptedTransport;
    use serde_json::json;

    #[tokio::test]
    async fn test_place_bet_sends_single_post() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            "/bets",
            json!({
                "bet": {"id": "b1", "status": "lost"},
                "gameDetails": {"won": false, "resultValue": 3}
            }),
        );
        let games = GamesService::new(transport.clone());

        let wager = Wager::new(10.0, BetSelection::DiceRoll(DiceBet::Exact { number: 6 }));
        let response = games.place_bet(&wager).await.unwrap();
        assert_eq!(response.game_details.result_number(), Some(3));

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(
            requests[0].body.clone().unwrap(),
            json!({
                "gameType": "diceRoll",
                "amount": 10.0,
                "betDetails": {"type": "exact", "number": 6}
            })
        );
    }

    #[tokio::test]
    async fn test_history_and_ledger_queries() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("/bets", json!({"bets": [], "total": 0}));
        transport.respond("/transactions", json!({"transactions": []}));
        transport.respond("/bonuses/my-bonuses", json!({"bonuses": []}));

        let games = GamesService::new(transport.clone());
        let wallet = WalletService::new(transport.clone());

        games.recent_bets(GameType::Slots, 5).await.unwrap();
        wallet
            .transactions(&TransactionsQuery { page: 2, limit: 20, tx_type: None })
            .await
            .unwrap();
        wallet.bonuses().await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].query[0], ("offset".to_string(), "0".to_string()));
        assert!(requests[0].query.contains(&("gameType".to_string(), "slots".to_string())));
        assert_eq!(requests[1].query[0], ("offset".to_string(), "20".to_string()));
        assert_eq!(requests[2].path, "/bonuses/my-bonuses");
    }

    #[tokio::test]
    async fn test_withdrawal_payload() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("/transactions/withdrawal", json!({"message": "ok"}));
        let wallet = WalletService::new(transport.clone());

        wallet
            .request_withdrawal(250.0, AccountDetails::Upi { upi_id: "me@upi".into() })
            .await
            .unwrap();

        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(
            body,
            json!({"amount": 250.0, "accountDetails": {"method": "upi", "upiId": "me@upi"}})
        );
    }

    #[test]
    fn test_container_rejects_invalid_config() {
        let mut config = ClientConfig::default();
        config.api.request_timeout_secs = 0;
        assert!(ServiceContainer::new(config).is_err());
    }
}
