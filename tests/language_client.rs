use std::path::PathBuf;

use reqwest::Url;
use review_sentiment::{
    Config, LanguageClient, Sentiment, SentimentAnalyzer, SentimentError, SentimentResult,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    Config {
        input: PathBuf::from("reviews.xlsx"),
        endpoint: Url::parse(&server.uri()).unwrap(),
        key: "secret".into(),
    }
}

// The blocking client owns its own runtime, so it has to be built, used and
// dropped off the async worker threads.
async fn analyze(config: Config, text: &'static str) -> Result<SentimentResult, SentimentError> {
    tokio::task::spawn_blocking(move || {
        let client = LanguageClient::new(&config)?;
        client.analyze(text)
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn posts_opinion_mining_request_and_parses_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/language/:analyze-text"))
        .and(query_param("api-version", "2023-04-01"))
        .and(header("Ocp-Apim-Subscription-Key", "secret"))
        .and(body_partial_json(json!({
            "kind": "SentimentAnalysis",
            "parameters": {"opinionMining": true},
            "analysisInput": {"documents": [{"id": "1", "text": "Great coffee. Rude barista."}]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "SentimentAnalysisResults",
            "results": {
                "documents": [{
                    "id": "1",
                    "sentiment": "mixed",
                    "confidenceScores": {"positive": 0.48, "neutral": 0.02, "negative": 0.5},
                    "sentences": [
                        {"sentiment": "positive", "text": "Great coffee.", "offset": 0, "length": 13,
                         "confidenceScores": {"positive": 0.97, "neutral": 0.02, "negative": 0.01},
                         "targets": [], "assessments": []},
                        {"sentiment": "negative", "text": "Rude barista.", "offset": 14, "length": 13,
                         "confidenceScores": {"positive": 0.0, "neutral": 0.01, "negative": 0.99},
                         "targets": [], "assessments": []}
                    ],
                    "warnings": []
                }],
                "errors": [],
                "modelVersion": "2022-11-01"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = analyze(config_for(&server), "Great coffee. Rude barista.")
        .await
        .unwrap();

    assert_eq!(result.sentiment, Sentiment::Mixed);
    assert_eq!(result.sentences.len(), 2);
    assert_eq!(result.sentences[1].text, "Rude barista.");
    assert_eq!(result.sentences[1].offset, 14);
}

#[tokio::test(flavor = "multi_thread")]
async fn non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string("Access denied due to invalid subscription key."),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = analyze(config_for(&server), "anything").await.unwrap_err();
    match err {
        SentimentError::Status { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid subscription key"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn document_error_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "SentimentAnalysisResults",
            "results": {
                "documents": [],
                "errors": [{"id": "1", "error": {"code": "InvalidArgument", "message": "Invalid document in request."}}],
                "modelVersion": "2022-11-01"
            }
        })))
        .mount(&server)
        .await;

    let err = analyze(config_for(&server), "x").await.unwrap_err();
    assert!(matches!(err, SentimentError::Service { ref code, .. } if code == "InvalidArgument"));
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = analyze(config_for(&server), "x").await.unwrap_err();
    assert!(matches!(err, SentimentError::Http(_)));
}
