use secrecy::SecretString;
use urbano_core::CallerContext;

use crate::signature;

/// Read-only, by-name access to request parameters.
///
/// Implemented for the decoded form body and for the query string so the
/// handler never has to know which one the caller used.
pub trait ParameterSource {
    fn param(&self, name: &str) -> Option<&str>;
}

/// Decoded `application/x-www-form-urlencoded` pairs in arrival order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormParams {
    pairs: Vec<(String, String)>,
}

impl FormParams {
    pub fn parse(raw: &[u8]) -> Self {
        Self { pairs: url::form_urlencoded::parse(raw).into_owned().collect() }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl ParameterSource for FormParams {
    fn param(&self, name: &str) -> Option<&str> {
        self.pairs.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }
}

/// The fields Slack sends with a slash-command invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlashCommandPayload {
    pub text: String,
    pub user_name: String,
    pub channel_name: String,
    pub team_id: String,
    pub token: String,
    pub command: String,
    pub user_id: String,
    pub channel_id: String,
    pub team_domain: String,
    pub response_url: String,
}

/// What the handlers act on once a payload is normalized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandRequest {
    pub command: String,
    pub word: String,
    pub caller: CallerContext,
}

impl SlashCommandPayload {
    /// Collects every field from the first source that carries a non-empty
    /// value for it. Earlier sources take precedence.
    pub fn from_sources(sources: &[&dyn ParameterSource]) -> Self {
        let field = |name: &str| -> String {
            sources
                .iter()
                .filter_map(|source| source.param(name))
                .find(|value| !value.is_empty())
                .unwrap_or_default()
                .to_owned()
        };

        Self {
            text: field("text"),
            user_name: field("user_name"),
            channel_name: field("channel_name"),
            team_id: field("team_id"),
            token: field("token"),
            command: field("command"),
            user_id: field("user_id"),
            channel_id: field("channel_id"),
            team_domain: field("team_domain"),
            response_url: field("response_url"),
        }
    }

    /// `true` when no token is expected, or when the supplied one matches.
    pub fn token_matches(&self, expected: Option<&SecretString>) -> bool {
        match expected {
            None => true,
            Some(expected) => signature::token_matches(expected, &self.token),
        }
    }

    pub fn caller(&self) -> CallerContext {
        CallerContext::new(&self.user_name, &self.channel_name, &self.team_id)
    }

    pub fn into_request(self) -> CommandRequest {
        let caller = self.caller();
        CommandRequest { command: self.command, word: normalize_word(&self.text), caller }
    }
}

/// Collapses runs of whitespace so `"  big   mood "` looks up `"big mood"`.
pub fn normalize_word(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
