//! HTTP source for the Urban Dictionary REST API.
//!
//! Exposes `GET <base>/define?term=<word>` and `GET <base>/random` as a
//! [`DefinitionSource`]. Every call is bounded by the client timeout taken from
//! `upstream.timeout_secs`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use urbano_core::config::UpstreamConfig;
use urbano_core::{CandidateList, DefinitionCandidate, DefinitionSource, LookupError};

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid upstream base url `{url}`: {source}")]
    InvalidBaseUrl { url: String, source: url::ParseError },
    #[error("http client construction failed: {0}")]
    Http(#[source] reqwest::Error),
}

#[derive(Clone, Debug)]
pub struct UrbanDictionaryApi {
    client: Client,
    define_url: Url,
    random_url: Url,
}

impl UrbanDictionaryApi {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ClientBuildError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(ClientBuildError::Http)?;

        Self::with_client(client, &config.base_url)
    }

    /// Uses a caller-built client, e.g. one with a shorter timeout.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, ClientBuildError> {
        let invalid =
            |source| ClientBuildError::InvalidBaseUrl { url: base_url.to_owned(), source };

        let mut base = Url::parse(base_url.trim()).map_err(invalid)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let define_url = base.join("define").map_err(invalid)?;
        let random_url = base.join("random").map_err(invalid)?;

        Ok(Self { client, define_url, random_url })
    }

    pub fn define_url(&self) -> &Url {
        &self.define_url
    }

    pub fn random_url(&self) -> &Url {
        &self.random_url
    }

    async fn fetch(
        &self,
        request: RequestBuilder,
    ) -> Result<Vec<DefinitionCandidate>, LookupError> {
        let response = request.send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                event_name = "upstream.response.status",
                status = status.as_u16(),
                url = %response.url(),
                "dictionary upstream returned non-success status"
            );
            return Err(LookupError::UpstreamStatus(status.as_u16()));
        }

        let body = response.bytes().await.map_err(transport_error)?;
        let decoded = serde_json::from_slice::<CandidateList>(&body)
            .map_err(|error| LookupError::Parse(error.to_string()))?;

        debug!(
            event_name = "upstream.response.decoded",
            candidate_count = decoded.list.len(),
            body_bytes = body.len(),
            "dictionary upstream response decoded"
        );
        Ok(decoded.list)
    }
}

#[async_trait]
impl DefinitionSource for UrbanDictionaryApi {
    async fn define(&self, term: &str) -> Result<Vec<DefinitionCandidate>, LookupError> {
        let request = self.client.get(self.define_url.clone()).query(&[("term", term)]);
        self.fetch(request).await
    }

    async fn random(&self) -> Result<Vec<DefinitionCandidate>, LookupError> {
        self.fetch(self.client.get(self.random_url.clone())).await
    }
}

fn transport_error(error: reqwest::Error) -> LookupError {
    if error.is_timeout() {
        LookupError::Transport(format!("request timed out: {error}"))
    } else {
        LookupError::Transport(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use reqwest::Client;
    use serde_json::json;
    use urbano_core::config::UpstreamConfig;
    use urbano_core::{
        DefinitionSource, DictionaryClient, LookupError, RandomWordPolicy, RetryPolicy,
    };
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{ClientBuildError, UrbanDictionaryApi};

    fn api(server: &MockServer) -> UrbanDictionaryApi {
        UrbanDictionaryApi::new(&UpstreamConfig {
            base_url: format!("{}/v0", server.uri()),
            timeout_secs: 5,
            user_agent: "urbano-test".to_owned(),
        })
        .expect("api client")
    }

    fn hello_body() -> serde_json::Value {
        json!({
            "list": [
                {"word": "hello", "definition": "A greeting", "thumbs_up": 5, "thumbs_down": 1},
                {"word": "hello", "definition": "Slang for goodbye", "thumbs_up": 42}
            ]
        })
    }

    #[test]
    fn base_url_keeps_its_path_prefix() {
        let api = UrbanDictionaryApi::with_client(Client::new(), "https://api.example.test/v0")
            .expect("api client");

        assert_eq!(api.define_url().as_str(), "https://api.example.test/v0/define");
        assert_eq!(api.random_url().as_str(), "https://api.example.test/v0/random");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let error = UrbanDictionaryApi::with_client(Client::new(), "not a url")
            .expect_err("invalid url");

        assert!(matches!(error, ClientBuildError::InvalidBaseUrl { .. }));
    }

    #[tokio::test]
    async fn define_queries_term_and_decodes_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/define"))
            .and(query_param("term", "hello"))
            .respond_with(ResponseTemplate::new(200).set_body_json(hello_body()))
            .expect(1)
            .mount(&server)
            .await;

        let candidates = api(&server).define("hello").await.expect("candidates");

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].approval_count, 42);
        assert_eq!(candidates[0].disapproval_count, 1);
    }

    #[tokio::test]
    async fn define_encodes_spaces_and_reserved_characters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/define"))
            .and(query_param("term", "big mood&x=1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"list": []})))
            .expect(1)
            .mount(&server)
            .await;

        let candidates = api(&server).define("big mood&x=1").await.expect("candidates");

        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/define"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let error = api(&server).define("hello").await.expect_err("parse error");

        assert!(matches!(error, LookupError::Parse(_)));
    }

    #[tokio::test]
    async fn body_without_list_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .mount(&server)
            .await;

        let error = api(&server).random().await.expect_err("parse error");

        assert!(matches!(error, LookupError::Parse(_)));
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/define"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let error = api(&server).define("hello").await.expect_err("status error");

        assert_eq!(error, LookupError::UpstreamStatus(503));
    }

    #[tokio::test]
    async fn slow_upstream_times_out_as_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/random"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"list": []}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client =
            Client::builder().timeout(Duration::from_millis(200)).build().expect("client");
        let api = UrbanDictionaryApi::with_client(client, &format!("{}/v0", server.uri()))
            .expect("api client");

        let error = api.random().await.expect_err("timeout");

        assert!(
            matches!(error, LookupError::Transport(ref message) if message.contains("timed out"))
        );
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_error() {
        let address = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("local addr")
        };
        let base_url = format!("http://{address}/v0");
        let api = UrbanDictionaryApi::with_client(Client::new(), &base_url).expect("api client");

        let define = api.define("hello").await;
        let random = api.random().await;

        assert!(matches!(define, Err(LookupError::Transport(_))), "define gave {define:?}");
        assert!(matches!(random, Err(LookupError::Transport(_))), "random gave {random:?}");
    }

    #[tokio::test]
    async fn dictionary_client_selects_top_voted_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/define"))
            .and(query_param("term", "hello"))
            .respond_with(ResponseTemplate::new(200).set_body_json(hello_body()))
            .mount(&server)
            .await;

        let client = DictionaryClient::new(Arc::new(api(&server)), RandomWordPolicy::default());
        let found = client.define("hello").await.expect("definition");

        assert_eq!(found.definition, "Slang for goodbye");
    }

    #[tokio::test]
    async fn dictionary_client_retries_random_batches_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "list": [{"word": "meh", "definition": "unpopular", "thumbs_up": 3}]
            })))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v0/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "list": [
                    {"word": "meh", "definition": "unpopular", "thumbs_up": 3},
                    {"word": "yeet", "definition": "to throw", "thumbs_up": 20000}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = DictionaryClient::new(
            Arc::new(api(&server)),
            RandomWordPolicy {
                threshold: 13_000,
                retry: RetryPolicy { max_retries: 5, base_delay_ms: 1, max_delay_ms: 5 },
            },
        );
        let found = client.random_word().await.expect("random word");

        assert_eq!(found.word, "yeet");
        assert_eq!(found.approval_count, 20_000);
    }
}
