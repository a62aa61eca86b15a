//! Slash-command endpoints.
//!
//! `/word` defines the caller's word, `/random` returns a popular random one.
//! Both accept GET or POST, read parameters from the form body and the query
//! string alike, and are also mounted under `/v1` and `/urbano/v1`.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use secrecy::SecretString;
use tracing::{error, info, warn};
use urbano_core::{DictionaryClient, LookupError};
use urbano_slack::commands::{CommandRequest, FormParams, SlashCommandPayload};
use urbano_slack::responses::{
    definition_message, not_found_message, placeholder_message, random_word_message,
};
use urbano_slack::signature::{self, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use uuid::Uuid;

const ROUTE_PREFIXES: [&str; 3] = ["", "/v1", "/urbano/v1"];

#[derive(Clone, Debug)]
pub struct HandlerSettings {
    pub bot_version: String,
    pub empty_text_reply: String,
    pub signing_secret: Option<SecretString>,
    pub verification_token: Option<SecretString>,
    pub request_timeout: Duration,
}

#[derive(Clone)]
pub struct CommandState {
    dictionary: DictionaryClient,
    settings: Arc<HandlerSettings>,
}

impl CommandState {
    pub fn new(dictionary: DictionaryClient, settings: HandlerSettings) -> Self {
        Self { dictionary, settings: Arc::new(settings) }
    }
}

pub fn router(state: CommandState) -> Router {
    ROUTE_PREFIXES
        .iter()
        .fold(Router::new(), |router, prefix| {
            router
                .route(&format!("{prefix}/word"), get(define_word).post(define_word))
                .route(&format!("{prefix}/random"), get(random_word).post(random_word))
        })
        .with_state(state)
}

/// Parsed request plus the id its log lines share.
struct Inbound {
    correlation_id: String,
    origin: &'static str,
    request: CommandRequest,
}

fn read_command(
    state: &CommandState,
    headers: &HeaderMap,
    raw_query: Option<String>,
    body: &Bytes,
    endpoint: &'static str,
) -> Result<Inbound, Response> {
    let correlation_id = Uuid::new_v4().to_string();
    let form = FormParams::parse(body);
    let query = FormParams::parse(raw_query.as_deref().unwrap_or_default().as_bytes());
    let payload = SlashCommandPayload::from_sources(&[&form, &query]);
    let origin = if form.is_empty() { "query" } else { "form" };

    // A configured signing secret replaces the legacy token check.
    if let Some(secret) = state.settings.signing_secret.as_ref() {
        let header = |name: &str| headers.get(name).and_then(|value| value.to_str().ok());
        let now_secs =
            SystemTime::now().duration_since(UNIX_EPOCH).map(|now| now.as_secs()).unwrap_or(0);

        if let Err(rejection) = signature::verify_request(
            secret,
            header(TIMESTAMP_HEADER),
            header(SIGNATURE_HEADER),
            body,
            now_secs,
        ) {
            warn!(
                event_name = "http.command.rejected",
                correlation_id = %correlation_id,
                endpoint,
                origin,
                reason = rejection.kind(),
                error = %rejection,
                user = %payload.user_name,
                team = %payload.team_id,
                channel = %payload.channel_name,
                "slash command signature check failed"
            );
            return Err(StatusCode::UNAUTHORIZED.into_response());
        }
    } else if !payload.token_matches(state.settings.verification_token.as_ref()) {
        warn!(
            event_name = "http.command.rejected",
            correlation_id = %correlation_id,
            endpoint,
            origin,
            reason = "token_mismatch",
            user = %payload.user_name,
            team = %payload.team_id,
            channel = %payload.channel_name,
            "slash command verification token mismatch"
        );
        return Err(StatusCode::UNAUTHORIZED.into_response());
    }

    Ok(Inbound { correlation_id, origin, request: payload.into_request() })
}

pub async fn define_word(
    State(state): State<CommandState>,
    headers: HeaderMap,
    RawQuery(raw_query): RawQuery,
    body: Bytes,
) -> Response {
    let Inbound { correlation_id, origin, request } =
        match read_command(&state, &headers, raw_query, &body, "word") {
            Ok(inbound) => inbound,
            Err(rejection) => return rejection,
        };
    let CommandRequest { word, caller, .. } = &request;
    let settings = &state.settings;

    info!(
        event_name = "http.word.received",
        correlation_id = %correlation_id,
        origin,
        word = %word,
        user = %caller.user_name,
        team = %caller.team_id,
        channel = %caller.channel_name,
        "definition request received"
    );

    if word.is_empty() {
        info!(
            event_name = "http.word.empty",
            correlation_id = %correlation_id,
            user = %caller.user_name,
            team = %caller.team_id,
            channel = %caller.channel_name,
            "no word supplied; returning placeholder"
        );
        let reply = placeholder_message(&settings.empty_text_reply, &settings.bot_version);
        return (StatusCode::OK, Json(reply)).into_response();
    }

    let lookup = tokio::time::timeout(settings.request_timeout, state.dictionary.define(word));
    match lookup.await {
        Ok(Ok(candidate)) => {
            info!(
                event_name = "http.word.returned",
                correlation_id = %correlation_id,
                word = %word,
                approval_count = candidate.approval_count,
                user = %caller.user_name,
                team = %caller.team_id,
                channel = %caller.channel_name,
                "returning definition"
            );
            let reply = definition_message(word, &candidate, &settings.bot_version);
            (StatusCode::OK, Json(reply)).into_response()
        }
        Ok(Err(LookupError::NotFound { .. })) => {
            info!(
                event_name = "http.word.not_found",
                correlation_id = %correlation_id,
                word = %word,
                user = %caller.user_name,
                team = %caller.team_id,
                channel = %caller.channel_name,
                "word not found"
            );
            let reply = not_found_message(word, &settings.bot_version);
            (StatusCode::OK, Json(reply)).into_response()
        }
        Ok(Err(lookup_error)) => {
            error!(
                event_name = "http.word.failed",
                correlation_id = %correlation_id,
                word = %word,
                error_kind = lookup_error.kind(),
                error = %lookup_error,
                user = %caller.user_name,
                team = %caller.team_id,
                channel = %caller.channel_name,
                "definition lookup failed"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Err(_) => {
            error!(
                event_name = "http.word.deadline_exceeded",
                correlation_id = %correlation_id,
                word = %word,
                timeout_secs = settings.request_timeout.as_secs_f64(),
                user = %caller.user_name,
                team = %caller.team_id,
                channel = %caller.channel_name,
                "definition lookup exceeded request deadline"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn random_word(
    State(state): State<CommandState>,
    headers: HeaderMap,
    RawQuery(raw_query): RawQuery,
    body: Bytes,
) -> Response {
    let Inbound { correlation_id, origin, request } =
        match read_command(&state, &headers, raw_query, &body, "random") {
            Ok(inbound) => inbound,
            Err(rejection) => return rejection,
        };
    let caller = &request.caller;
    let settings = &state.settings;

    info!(
        event_name = "http.random.received",
        correlation_id = %correlation_id,
        origin,
        user = %caller.user_name,
        team = %caller.team_id,
        channel = %caller.channel_name,
        "random word request received"
    );

    let lookup = tokio::time::timeout(settings.request_timeout, state.dictionary.random_word());
    match lookup.await {
        Ok(Ok(candidate)) => {
            info!(
                event_name = "http.random.returned",
                correlation_id = %correlation_id,
                word = %candidate.word,
                approval_count = candidate.approval_count,
                user = %caller.user_name,
                team = %caller.team_id,
                channel = %caller.channel_name,
                "returning random word"
            );
            let reply = random_word_message(&candidate, &settings.bot_version);
            (StatusCode::OK, Json(reply)).into_response()
        }
        Ok(Err(lookup_error)) => {
            error!(
                event_name = "http.random.failed",
                correlation_id = %correlation_id,
                error_kind = lookup_error.kind(),
                error = %lookup_error,
                user = %caller.user_name,
                team = %caller.team_id,
                channel = %caller.channel_name,
                "random word lookup failed"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Err(_) => {
            error!(
                event_name = "http.random.deadline_exceeded",
                correlation_id = %correlation_id,
                timeout_secs = settings.request_timeout.as_secs_f64(),
                user = %caller.user_name,
                team = %caller.team_id,
                channel = %caller.channel_name,
                "random word lookup exceeded request deadline"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
