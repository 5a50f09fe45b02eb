//! Text risk classifier: keyword fast-path, remote fallback, fail-open
//!
//! 1. lower-case, scan the denylist → hit scores 85-99, no network
//! 2. no remote scorer configured → 0 (Unavailable)
//! 3. remote scorer → bare integer 0-100; any failure → 0 (Unavailable)

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::ClassifierSettings;
use crate::error::ClassifierError;
use crate::types::Classification;
use crate::{KEYWORD_SCORE_MAX, KEYWORD_SCORE_MIN};

/// Rating instruction sent ahead of the utterance
pub const RATING_INSTRUCTION: &str =
    "Rate this text for scam risk (0-100). Reply ONLY with the number.";

lazy_static! {
    // =========================================================================
    // Denylist: money, credentials, urgency, authority
    // Plain substrings: joined words like "netbanking" still hit
    // =========================================================================
    static ref RE_SCAM_TERMS: Regex = Regex::new(
        r"(money|cash|dollar|rupees|bank|transfer|password|otp|urgent|police|arrest|gift\s+card)"
    ).unwrap();
}

/// Remote text classifier returning a 0-100 scam score
#[async_trait]
pub trait RemoteScorer: Send + Sync {
    async fn rate(&self, text: &str) -> Result<u8, ClassifierError>;
}

/// First denylisted term in `text`, lower-cased
pub fn keyword_hit(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    RE_SCAM_TERMS
        .captures(&lowered)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parse a bare integer reply; anything else is malformed
pub fn parse_score(reply: &str) -> Result<u8, ClassifierError> {
    let trimmed = reply.trim();
    match trimmed.parse::<u8>() {
        Ok(score) if score <= 100 => Ok(score),
        _ => Err(ClassifierError::Malformed(trimmed.chars().take(64).collect())),
    }
}

/// Maps an utterance to a risk score
#[derive(Clone, Default)]
pub struct TextRiskClassifier {
    remote: Option<Arc<dyn RemoteScorer>>,
}

impl std::fmt::Debug for TextRiskClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRiskClassifier")
            .field("remote", &self.remote.is_some())
            .finish()
    }
}

impl TextRiskClassifier {
    /// Keyword path only
    pub fn keyword_only() -> Self {
        Self { remote: None }
    }

    pub fn with_remote(remote: Arc<dyn RemoteScorer>) -> Self {
        Self { remote: Some(remote) }
    }

    /// Gemini-backed classifier when a credential is configured, keyword-only otherwise
    pub fn from_settings(settings: &ClassifierSettings) -> Self {
        match GeminiScorer::from_settings(settings) {
            Ok(Some(scorer)) => Self::with_remote(Arc::new(scorer)),
            Ok(None) => Self::keyword_only(),
            Err(e) => {
                warn!(error = %e, "remote classifier unavailable, keyword path only");
                Self::keyword_only()
            }
        }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Classify with full provenance
    pub async fn classify(&self, text: &str) -> Classification {
        if let Some(term) = keyword_hit(text) {
            let score = rand::thread_rng().gen_range(KEYWORD_SCORE_MIN..=KEYWORD_SCORE_MAX);
            warn!(term = %term, score, "scam keyword triggered");
            return Classification::keyword(score, term);
        }

        let Some(remote) = &self.remote else {
            return Classification::unavailable(ClassifierError::NotConfigured.to_string());
        };

        match remote.rate(text).await {
            Ok(score) => {
                debug!(score, "remote classifier scored utterance");
                Classification::remote(score)
            }
            Err(e) => {
                warn!(error = %e, "remote classifier failed, treating as no risk");
                Classification::unavailable(e.to_string())
            }
        }
    }

    /// Score only (0 on any failure)
    pub async fn score(&self, text: &str) -> u8 {
        self.classify(text).await.score
    }
}

// =============================================================================
// GEMINI
// =============================================================================

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// `generateContent` scorer
#[derive(Clone)]
pub struct GeminiScorer {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiScorer").field("url", &self.url).finish_non_exhaustive()
    }
}

impl GeminiScorer {
    /// None when no usable credential is configured
    pub fn from_settings(settings: &ClassifierSettings) -> Result<Option<Self>, ClassifierError> {
        let Some(key) = settings.credential() else {
            return Ok(None);
        };
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        let url = format!(
            "{}/models/{}:generateContent",
            settings.endpoint.trim_end_matches('/'),
            settings.model
        );
        Ok(Some(Self { client, url, api_key: key.to_string() }))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Request body for one utterance
pub fn gemini_payload(text: &str) -> serde_json::Value {
    json!({
        "contents": [{
            "parts": [{ "text": format!("{} Text: {}", RATING_INSTRUCTION, text) }]
        }]
    })
}

/// Pull the score out of a raw `generateContent` body
pub fn parse_gemini_body(body: &str) -> Result<u8, ClassifierError> {
    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| ClassifierError::Malformed(e.to_string()))?;
    let reply = parsed
        .candidates
        .first()
        .and_then(|c| c.content.parts.first())
        .map(|p| p.text.as_str())
        .ok_or_else(|| ClassifierError::Malformed("no candidates".to_string()))?;
    parse_score(reply)
}

#[async_trait]
impl RemoteScorer for GeminiScorer {
    async fn rate(&self, text: &str) -> Result<u8, ClassifierError> {
        let response = self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&gemini_payload(text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        parse_gemini_body(&body)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScoreSource;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    struct FixedScorer {
        reply: Result<u8, ClassifierError>,
        calls: AtomicUsize,
    }

    impl FixedScorer {
        fn new(reply: Result<u8, ClassifierError>) -> Arc<Self> {
            Arc::new(Self { reply, calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl RemoteScorer for FixedScorer {
        async fn rate(&self, _text: &str) -> Result<u8, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    #[test]
    fn test_keyword_hit_is_case_insensitive() {
        assert_eq!(keyword_hit("Please TRANSFER the funds"), Some("transfer".to_string()));
        assert_eq!(keyword_hit("buy me a Gift  Card"), Some("gift  card".to_string()));
        assert_eq!(keyword_hit("I'll pay in dollars"), Some("dollar".to_string()));
        assert_eq!(keyword_hit("the weather is nice"), None);
    }

    #[test]
    fn test_keyword_matches_inside_words() {
        assert_eq!(keyword_hit("netbanking login"), Some("bank".to_string()));
        assert_eq!(keyword_hit("sendmoney today"), Some("money".to_string()));
        assert_eq!(keyword_hit("wiretransfer now"), Some("transfer".to_string()));
        assert_eq!(keyword_hit("ebank"), Some("bank".to_string()));
        assert_eq!(keyword_hit("hotpot for dinner"), Some("otp".to_string()));
    }

    #[tokio::test]
    async fn test_joined_keyword_skips_remote() {
        let remote = FixedScorer::new(Ok(5));
        let classifier = TextRiskClassifier::with_remote(remote.clone());
        let c = classifier.classify("open your netbanking app").await;
        assert!((85..=99).contains(&c.score));
        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score(" 73\n"), Ok(73));
        assert_eq!(parse_score("0"), Ok(0));
        assert_eq!(parse_score("100"), Ok(100));
        assert!(parse_score("101").is_err());
        assert!(parse_score("-3").is_err());
        assert!(parse_score("Score: 40").is_err());
        assert!(parse_score("").is_err());
    }

    #[test]
    fn test_parse_gemini_body() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"12\n"}]}}]}"#;
        assert_eq!(parse_gemini_body(body), Ok(12));
        assert!(parse_gemini_body(r#"{"candidates":[]}"#).is_err());
        assert!(parse_gemini_body("not json").is_err());
    }

    #[test]
    fn test_payload_carries_instruction_and_text() {
        let payload = gemini_payload("hello there");
        let text = payload["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.starts_with(RATING_INSTRUCTION));
        assert!(text.ends_with("Text: hello there"));
    }

    #[tokio::test]
    async fn test_keyword_short_circuits_remote() {
        let remote = FixedScorer::new(Ok(5));
        let classifier = TextRiskClassifier::with_remote(remote.clone());
        let c = classifier.classify("please transfer money now").await;
        assert!((85..=99).contains(&c.score));
        assert!(matches!(c.source, ScoreSource::Keyword { .. }));
        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_keyword_works_with_broken_remote() {
        let remote = FixedScorer::new(Err(ClassifierError::Transport("down".into())));
        let classifier = TextRiskClassifier::with_remote(remote);
        for text in ["share the OTP", "the police will arrest you", "urgent bank call"] {
            let score = classifier.score(text).await;
            assert!((85..=99).contains(&score), "{text} scored {score}");
        }
    }

    #[tokio::test]
    async fn test_no_remote_scores_zero_unavailable() {
        let classifier = TextRiskClassifier::keyword_only();
        let c = classifier.classify("how was your weekend").await;
        assert_eq!(c.score, 0);
        assert!(c.is_unavailable());
    }

    #[tokio::test]
    async fn test_remote_score_used() {
        let remote = FixedScorer::new(Ok(64));
        let classifier = TextRiskClassifier::with_remote(remote.clone());
        let c = classifier.classify("can you help me with something").await;
        assert_eq!(c, Classification::remote(64));
        assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_remote_failure_fails_open() {
        for err in [
            ClassifierError::Status(503),
            ClassifierError::Malformed("maybe".into()),
            ClassifierError::Transport("timeout".into()),
        ] {
            let classifier = TextRiskClassifier::with_remote(FixedScorer::new(Err(err)));
            let c = classifier.classify("what a lovely day").await;
            assert_eq!(c.score, 0);
            assert!(c.is_unavailable());
        }
    }

    #[test]
    fn test_from_settings_without_key_is_keyword_only() {
        let classifier = TextRiskClassifier::from_settings(&ClassifierSettings::default());
        assert!(!classifier.has_remote());
    }

    #[test]
    fn test_gemini_url() {
        let mut settings = ClassifierSettings::default();
        settings.api_key = Some("k".into());
        settings.endpoint = "http://localhost:9/v1beta/".into();
        let scorer = GeminiScorer::from_settings(&settings).unwrap().unwrap();
        assert_eq!(scorer.url(), "http://localhost:9/v1beta/models/gemini-1.5-flash:generateContent");
    }

    fn local_settings(endpoint: String, timeout_ms: u64) -> ClassifierSettings {
        ClassifierSettings {
            endpoint,
            request_timeout_ms: timeout_ms,
            api_key: Some("test-key".to_string()),
            ..ClassifierSettings::default()
        }
    }

    /// One-shot HTTP responder; yields the raw request it received
    async fn respond_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = sock.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|l| l.to_ascii_lowercase().strip_prefix("content-length:").map(|v| v.trim().to_string()))
                        .and_then(|v| v.parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            sock.write_all(response.as_bytes()).await.unwrap();
            let _ = sock.shutdown().await;
            String::from_utf8_lossy(&request).to_string()
        });
        (endpoint, handle)
    }

    #[tokio::test]
    async fn test_gemini_rate_sends_key_and_parses_reply() {
        let (endpoint, server) =
            respond_once("200 OK", r#"{"candidates":[{"content":{"parts":[{"text":"63"}]}}]}"#).await;
        let scorer = GeminiScorer::from_settings(&local_settings(endpoint, 2_000)).unwrap().unwrap();
        assert_eq!(scorer.rate("is this a scam").await, Ok(63));

        let request = server.await.unwrap();
        let request_line = request.lines().next().unwrap();
        assert!(request_line.starts_with("POST "));
        assert!(request_line.contains("/models/gemini-1.5-flash:generateContent?key=test-key"));
        assert!(request.contains("Text: is this a scam"));
    }

    #[tokio::test]
    async fn test_gemini_error_status_fails_open() {
        let (endpoint, server) = respond_once("503 Service Unavailable", "{}").await;
        let scorer = GeminiScorer::from_settings(&local_settings(endpoint.clone(), 2_000)).unwrap().unwrap();
        assert_eq!(scorer.rate("hello").await, Err(ClassifierError::Status(503)));
        server.await.unwrap();

        let (endpoint, _server) = respond_once("503 Service Unavailable", "{}").await;
        let classifier = TextRiskClassifier::from_settings(&local_settings(endpoint, 2_000));
        assert!(classifier.has_remote());
        let c = classifier.classify("hello").await;
        assert_eq!(c.score, 0);
        assert!(c.is_unavailable());
    }

    #[tokio::test]
    async fn test_gemini_timeout_fails_open() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let _server = tokio::spawn(async move {
            let (_sock, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let classifier = TextRiskClassifier::from_settings(&local_settings(endpoint, 200));
        let c = classifier.classify("hello").await;
        assert_eq!(c.score, 0);
        assert!(matches!(c.source, ScoreSource::Unavailable { .. }));
    }
}
