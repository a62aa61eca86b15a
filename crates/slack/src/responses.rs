use serde::{Deserialize, Serialize};
use urbano_core::DefinitionCandidate;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    InChannel,
    Ephemeral,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackResponse {
    pub text: String,
    pub response_type: ResponseType,
    pub bot_version: String,
}

impl SlackResponse {
    pub fn in_channel(text: impl Into<String>, bot_version: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            response_type: ResponseType::InChannel,
            bot_version: bot_version.into(),
        }
    }

    pub fn ephemeral(text: impl Into<String>, bot_version: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            response_type: ResponseType::Ephemeral,
            bot_version: bot_version.into(),
        }
    }
}

pub fn placeholder_message(reply: &str, bot_version: &str) -> SlackResponse {
    SlackResponse::in_channel(reply, bot_version)
}

/// `<word> --> <definition>` for the word the caller asked about.
pub fn definition_message(
    word: &str,
    candidate: &DefinitionCandidate,
    bot_version: &str,
) -> SlackResponse {
    SlackResponse::in_channel(format_definition(word, &candidate.definition), bot_version)
}

/// Same shape as [`definition_message`], labelled with the random entry's own word.
pub fn random_word_message(candidate: &DefinitionCandidate, bot_version: &str) -> SlackResponse {
    let text = format_definition(&candidate.word, &candidate.definition);
    SlackResponse::in_channel(text, bot_version)
}

pub fn not_found_message(word: &str, bot_version: &str) -> SlackResponse {
    SlackResponse::ephemeral(format!("{word} - Word not found"), bot_version)
}

fn format_definition(word: &str, definition: &str) -> String {
    format!("{word} --> {}", definition.trim())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use urbano_core::DefinitionCandidate;

    use super::{
        definition_message, not_found_message, placeholder_message, random_word_message,
        ResponseType,
    };

    fn candidate(word: &str, definition: &str) -> DefinitionCandidate {
        DefinitionCandidate {
            word: word.to_owned(),
            definition: definition.to_owned(),
            approval_count: 42,
            ..DefinitionCandidate::default()
        }
    }

    #[test]
    fn serializes_with_slack_field_names() {
        let response =
            definition_message("hello", &candidate("hello", "Slang for goodbye"), "1.3.0");

        let value = serde_json::to_value(&response).expect("serialize");

        assert_eq!(
            value,
            json!({
                "text": "hello --> Slang for goodbye",
                "response_type": "in_channel",
                "bot_version": "1.3.0"
            })
        );
    }

    #[test]
    fn definition_text_is_trimmed() {
        let response = definition_message("yeet", &candidate("Yeet", "\r\nto throw\r\n"), "v");

        assert_eq!(response.text, "yeet --> to throw");
    }

    #[test]
    fn random_message_uses_the_candidates_word() {
        let response = random_word_message(&candidate("Netflix and chill", "a euphemism"), "v");

        assert_eq!(response.text, "Netflix and chill --> a euphemism");
        assert_eq!(response.response_type, ResponseType::InChannel);
    }

    #[test]
    fn not_found_is_ephemeral() {
        let response = not_found_message("zzzznotaword", "v");

        assert_eq!(response.text, "zzzznotaword - Word not found");
        assert_eq!(response.response_type, ResponseType::Ephemeral);
    }

    #[test]
    fn placeholder_is_posted_in_channel() {
        let response = placeholder_message("Give me a word", "v");

        assert_eq!(response.text, "Give me a word");
        assert_eq!(response.response_type, ResponseType::InChannel);
        assert_eq!(response.bot_version, "v");
    }
}
