//! Client for the Azure AI Language sentiment endpoint.
//!
//! One blocking `analyze-text` request per call, with opinion mining enabled.
//! There is no retry; every failure is returned to the caller.

use std::fmt;

use reqwest::blocking::Client;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

pub const API_VERSION: &str = "2023-04-01";
const DOCUMENT_ID: &str = "1";

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("请求情感分析服务失败: {0}")]
    Http(#[from] reqwest::Error),

    #[error("情感分析服务返回 HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Error reported by the service for the submitted document
    #[error("情感分析服务错误 {code}: {message}")]
    Service { code: String, message: String },

    #[error("情感分析结果中没有文档 {0}")]
    MissingDocument(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    Mixed,
}

impl Sentiment {
    /// Lower-case label as the service spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
            Sentiment::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct ConfidenceScores {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceSentiment {
    pub text: String,
    pub sentiment: Sentiment,
    pub confidence_scores: ConfidenceScores,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentResult {
    pub sentiment: Sentiment,
    #[serde(default)]
    pub confidence_scores: ConfidenceScores,
    #[serde(default)]
    pub sentences: Vec<SentenceSentiment>,
}

/// Anything that can turn a review into a [`SentimentResult`].
pub trait SentimentAnalyzer {
    fn analyze(&self, text: &str) -> Result<SentimentResult, SentimentError>;
}

impl<T: SentimentAnalyzer + ?Sized> SentimentAnalyzer for &T {
    fn analyze(&self, text: &str) -> Result<SentimentResult, SentimentError> {
        (**self).analyze(text)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    kind: &'static str,
    parameters: Parameters,
    analysis_input: AnalysisInput<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters {
    opinion_mining: bool,
}

#[derive(Serialize)]
struct AnalysisInput<'a> {
    documents: [InputDocument<'a>; 1],
}

#[derive(Serialize)]
struct InputDocument<'a> {
    id: &'static str,
    text: &'a str,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    results: ResponseResults,
}

#[derive(Deserialize)]
struct ResponseResults {
    #[serde(default)]
    documents: Vec<ResponseDocument>,
    #[serde(default)]
    errors: Vec<DocumentError>,
}

#[derive(Deserialize)]
struct ResponseDocument {
    id: String,
    #[serde(flatten)]
    result: SentimentResult,
}

#[derive(Deserialize)]
struct DocumentError {
    id: String,
    error: ServiceError,
}

#[derive(Deserialize)]
struct ServiceError {
    code: String,
    message: String,
}

/// Picks document `id` out of an `analyze-text` response body.
fn extract_document(body: AnalyzeResponse, id: &str) -> Result<SentimentResult, SentimentError> {
    let ResponseResults { documents, errors } = body.results;

    if let Some(err) = errors.into_iter().find(|e| e.id == id) {
        return Err(SentimentError::Service {
            code: err.error.code,
            message: err.error.message,
        });
    }

    documents
        .into_iter()
        .find(|d| d.id == id)
        .map(|d| d.result)
        .ok_or_else(|| SentimentError::MissingDocument(id.to_string()))
}

pub struct LanguageClient {
    client: Client,
    url: Url,
    key: String,
}

impl LanguageClient {
    pub fn new(config: &Config) -> Result<Self, SentimentError> {
        let mut url = config.endpoint.clone();
        url.set_path(&format!(
            "{}/language/:analyze-text",
            config.endpoint.path().trim_end_matches('/')
        ));
        url.set_query(Some(&format!("api-version={API_VERSION}")));

        Ok(Self {
            client: Client::builder().build()?,
            url,
            key: config.key.clone(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl SentimentAnalyzer for LanguageClient {
    fn analyze(&self, text: &str) -> Result<SentimentResult, SentimentError> {
        let request = AnalyzeRequest {
            kind: "SentimentAnalysis",
            parameters: Parameters {
                opinion_mining: true,
            },
            analysis_input: AnalysisInput {
                documents: [InputDocument {
                    id: DOCUMENT_ID,
                    text,
                }],
            },
        };

        debug!(url = %self.url, chars = text.chars().count(), "sending analyze-text request");

        let response = self
            .client
            .post(self.url.clone())
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SentimentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: AnalyzeResponse = response.json()?;
        extract_document(body, DOCUMENT_ID)
    }
}
