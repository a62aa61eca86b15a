//! Slack slash-command surface for urbano.
//!
//! - **Commands** (`commands`) - parameter normalization for `/urban <word>`
//!   style invocations, whether Slack posts a form body or a test caller uses
//!   the query string
//! - **Responses** (`responses`) - the `{text, response_type, bot_version}`
//!   payload Slack renders back into the channel
//! - **Signature** (`signature`) - signing-secret HMAC verification, with the
//!   legacy verification token as a fallback
//!
//! # Flow
//!
//! ```text
//! form body ─┐
//!            ├→ SlashCommandPayload → CommandRequest → DictionaryClient
//! query  ────┘                                           ↓
//!                                  SlackResponse ← DefinitionCandidate
//! ```

pub mod commands;
pub mod responses;
pub mod signature;

pub use commands::{CommandRequest, FormParams, ParameterSource, SlashCommandPayload};
pub use responses::{ResponseType, SlackResponse};
pub use signature::SignatureError;
