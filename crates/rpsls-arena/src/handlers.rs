//! HTTP API handlers.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use rpsls_core::{
    ArenaError, Commitment, GameError, GameId, GameSnapshot, GameTerms, Move, Outcome, Payout,
    PlayerId, Salt,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;

// ============ Errors ============

/// Error body returned to the caller as `{"error", "kind"}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }
}

impl From<ArenaError> for ApiError {
    fn from(err: ArenaError) -> Self {
        match err {
            ArenaError::GameNotFound(id) => Self::new(
                StatusCode::NOT_FOUND,
                "game_not_found",
                format!("Game not found: {id}"),
            ),
            ArenaError::Game(game_err) => game_err.into(),
        }
    }
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        let status = match err {
            GameError::InvalidState(_) => StatusCode::CONFLICT,
            GameError::Unauthorized(_) => StatusCode::FORBIDDEN,
            GameError::Ledger(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, err.kind(), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({"error": self.message, "kind": self.kind})),
        )
            .into_response()
    }
}

// ============ Request/Response types ============

#[derive(Deserialize)]
pub struct CreateGameRequest {
    pub commitment: Commitment,
    pub stake: u64,
    pub timeout_secs: Option<u32>,
    pub opponent: Option<PlayerId>,
}

#[derive(Deserialize)]
pub struct JoinGameRequest {
    #[serde(rename = "move")]
    pub move_index: u8,
    pub amount: u64,
}

#[derive(Deserialize)]
pub struct RevealRequest {
    #[serde(rename = "move")]
    pub move_index: u8,
    pub salt: Salt,
}

#[derive(Serialize)]
pub struct RevealResponse {
    pub outcome: Outcome,
    pub game: GameSnapshot,
}

#[derive(Serialize)]
pub struct ClaimResponse {
    pub payout: Payout,
    pub game: GameSnapshot,
}

#[derive(Serialize)]
pub struct GamesResponse {
    pub games: Vec<GameSnapshot>,
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub player: PlayerId,
    pub balance: u64,
}

#[derive(Deserialize)]
pub struct CommitRequest {
    #[serde(rename = "move")]
    pub move_index: u8,
    pub salt: Salt,
}

#[derive(Serialize)]
pub struct CommitResponse {
    pub commitment: Commitment,
}

#[derive(Deserialize)]
pub struct TickRequest {
    pub seconds: i64,
}

#[derive(Serialize)]
pub struct TickResponse {
    pub now: DateTime<Utc>,
}

// ============ Helper to get player from header ============

fn player_from_headers(headers: &HeaderMap) -> Result<PlayerId, ApiError> {
    headers
        .get("X-Player-Id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .map(PlayerId::from_uuid)
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::UNAUTHORIZED,
                "missing_player",
                "Missing or invalid X-Player-Id header",
            )
        })
}

// ============ Game handlers ============

pub async fn create_game(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameSnapshot>), ApiError> {
    let player1 = player_from_headers(&headers)?;
    let config = state.config();

    let timeout = match req.timeout_secs {
        Some(secs) => Duration::seconds(secs.into()),
        None => config.default_timeout,
    };
    if timeout > config.max_timeout {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "invalid_timeout",
            format!(
                "timeout_secs exceeds maximum of {}",
                config.max_timeout.num_seconds()
            ),
        ));
    }

    let mut terms = GameTerms::new(req.commitment, req.stake, timeout);
    if let Some(opponent) = req.opponent {
        terms = terms.with_opponent(opponent);
    }

    let now = state.now();
    let id = state.arena().create(player1, terms, now);
    let snapshot = state.arena().get_state(id, now)?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

pub async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<GameId>,
) -> Result<Json<GameSnapshot>, ApiError> {
    let snapshot = state.arena().get_state(id, state.now())?;
    tracing::debug!("Snapshot of game {} in state {}", id, snapshot.state);
    Ok(Json(snapshot))
}

pub async fn list_open_games(State(state): State<AppState>) -> Json<GamesResponse> {
    Json(GamesResponse {
        games: state.arena().list_open(state.now()),
    })
}

pub async fn list_my_games(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<GamesResponse>, ApiError> {
    let player = player_from_headers(&headers)?;
    Ok(Json(GamesResponse {
        games: state.arena().list_for_player(player, state.now()),
    }))
}

pub async fn join_game(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<GameId>,
    Json(req): Json<JoinGameRequest>,
) -> Result<Json<GameSnapshot>, ApiError> {
    let player2 = player_from_headers(&headers)?;
    let snapshot = state
        .arena()
        .join(id, player2, req.move_index, req.amount, state.now())?;
    Ok(Json(snapshot))
}

pub async fn reveal_move(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<GameId>,
    Json(req): Json<RevealRequest>,
) -> Result<Json<RevealResponse>, ApiError> {
    let caller = player_from_headers(&headers)?;
    let now = state.now();
    let outcome = state
        .arena()
        .reveal(id, caller, req.move_index, &req.salt, now)?;
    let game = state.arena().get_state(id, now)?;
    Ok(Json(RevealResponse { outcome, game }))
}

pub async fn claim_timeout_before_join(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<GameId>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let caller = player_from_headers(&headers)?;
    let now = state.now();
    let payout = state.arena().claim_timeout_before_join(id, caller, now)?;
    claim_response(&state, id, payout, now)
}

pub async fn claim_timeout_after_join(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<GameId>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let caller = player_from_headers(&headers)?;
    let now = state.now();
    let payout = state.arena().claim_timeout_after_join(id, caller, now)?;
    claim_response(&state, id, payout, now)
}

pub async fn claim_timeout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<GameId>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let caller = player_from_headers(&headers)?;
    let now = state.now();
    let payout = state.arena().claim_timeout(id, caller, now)?;
    claim_response(&state, id, payout, now)
}

fn claim_response(
    state: &AppState,
    id: GameId,
    payout: Payout,
    now: DateTime<Utc>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let game = state.arena().get_state(id, now)?;
    Ok(Json(ClaimResponse { payout, game }))
}

// ============ Ledger handlers ============

pub async fn get_balance(
    State(state): State<AppState>,
    Path(player): Path<PlayerId>,
) -> Json<BalanceResponse> {
    Json(BalanceResponse {
        player,
        balance: state.arena().ledger().balance(player),
    })
}

// ============ Tooling handlers ============

/// Compute a commitment for the caller. The salt is not retained.
pub async fn compute_commitment(
    Json(req): Json<CommitRequest>,
) -> Result<Json<CommitResponse>, ApiError> {
    let mv = Move::try_from(req.move_index)?;
    Ok(Json(CommitResponse {
        commitment: Commitment::new(mv, &req.salt),
    }))
}

pub async fn tick(State(state): State<AppState>, Json(req): Json<TickRequest>) -> Json<TickResponse> {
    let now = state.advance_time(req.seconds);
    tracing::info!("Simulated clock advanced by {}s to {}", req.seconds, now);
    Json(TickResponse { now })
}

pub async fn health() -> &'static str {
    "ok"
}
