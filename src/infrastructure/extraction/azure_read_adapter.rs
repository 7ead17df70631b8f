use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use reqwest::Client;
use serde::Deserialize;

use crate::application::ports::{ExtractionError, Extractor};
use crate::domain::{ExtractionOptions, ExtractionResult, PageResult, TextItem};

pub const POLL_TIMEOUT: Duration = Duration::from_secs(300);
pub const INITIAL_BACKOFF: Duration = Duration::from_secs(2);
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);
pub const API_VERSION: &str = "2024-11-30";

/// OCR through the Azure Document Intelligence `prebuilt-read` model.
///
/// Words map to items. Bounding boxes are in the page unit Azure reports
/// (inches for PDFs, pixels for images). `dpi` is not used: Azure rasterizes
/// server side.
pub struct AzureReadAdapter {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl AzureReadAdapter {
    pub fn new(endpoint: &str, api_key: &str) -> Result<Self, ExtractionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ExtractionError::Unavailable(format!("http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn analyze_url(&self, languages: &[String]) -> String {
        let mut url = format!(
            "{}/documentintelligence/documentModels/prebuilt-read:analyze?api-version={}",
            self.endpoint, API_VERSION
        );
        // Azure accepts a single locale hint; with several languages let it
        // auto-detect.
        if let [language] = languages {
            url.push_str("&locale=");
            url.push_str(&azure_locale(language));
        }
        url
    }

    async fn submit(&self, data: &[u8], languages: &[String]) -> Result<String, ExtractionError> {
        let b64 = general_purpose::STANDARD.encode(data);
        let body = serde_json::json!({ "base64Source": b64 });

        let response = self
            .client
            .post(self.analyze_url(languages))
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ExtractionError::Failed(format!("Azure submit failed: {e}")))?;

        let status = response.status();
        if status.as_u16() == 400 {
            let text = response.text().await.unwrap_or_default();
            return Err(ExtractionError::InvalidDocument(format!(
                "Azure rejected document: {text}"
            )));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Failed(format!(
                "Azure submit returned {status}: {text}"
            )));
        }

        response
            .headers()
            .get("Operation-Location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                ExtractionError::Failed(
                    "Azure response missing Operation-Location header".to_string(),
                )
            })
    }

    async fn poll_until_complete(
        &self,
        operation_url: &str,
    ) -> Result<AnalyzeResult, ExtractionError> {
        let poll_future = async {
            let mut backoff = INITIAL_BACKOFF;

            loop {
                let response = self
                    .client
                    .get(operation_url)
                    .header("Ocp-Apim-Subscription-Key", &self.api_key)
                    .send()
                    .await
                    .map_err(|e| {
                        ExtractionError::Failed(format!("Azure poll request failed: {e}"))
                    })?;

                if response.status().as_u16() == 429 {
                    let retry_after = response
                        .headers()
                        .get("Retry-After")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(backoff.as_secs());
                    tokio::time::sleep(Duration::from_secs(retry_after)).await;
                    continue;
                }

                if !response.status().is_success() {
                    let status = response.status();
                    let text = response.text().await.unwrap_or_default();
                    return Err(ExtractionError::Failed(format!(
                        "Azure poll returned {status}: {text}"
                    )));
                }

                let result: AnalyzeResponse = response.json().await.map_err(|e| {
                    ExtractionError::Failed(format!("Azure response parse failed: {e}"))
                })?;

                match result.status.as_str() {
                    "succeeded" => return Ok(result.analyze_result.unwrap_or_default()),
                    "failed" => {
                        return Err(ExtractionError::Failed(
                            "Azure Document Intelligence analysis failed".to_string(),
                        ));
                    }
                    _ => {
                        tokio::time::sleep(backoff).await;
                        backoff = (backoff * 2).min(MAX_BACKOFF);
                    }
                }
            }
        };

        tokio::time::timeout(POLL_TIMEOUT, poll_future)
            .await
            .map_err(|_| {
                ExtractionError::Failed(format!(
                    "Azure Document Intelligence polling timed out after {}s",
                    POLL_TIMEOUT.as_secs()
                ))
            })?
    }
}

#[async_trait]
impl Extractor for AzureReadAdapter {
    #[tracing::instrument(skip(self, document), fields(bytes = document.len()))]
    async fn extract(
        &self,
        document: &[u8],
        options: &ExtractionOptions,
    ) -> Result<ExtractionResult, ExtractionError> {
        let operation_url = self.submit(document, &options.languages).await?;
        let analysis = self.poll_until_complete(&operation_url).await?;
        Ok(to_extraction_result(analysis, options.min_confidence))
    }

    fn name(&self) -> &'static str {
        "azure"
    }
}

/// EasyOCR-style codes to the BCP-47 tags Azure expects.
fn azure_locale(code: &str) -> String {
    match code {
        "ch_sim" => "zh-Hans".to_string(),
        "ch_tra" => "zh-Hant".to_string(),
        other => other.replace('_', "-"),
    }
}

fn to_extraction_result(analysis: AnalyzeResult, min_confidence: f32) -> ExtractionResult {
    let pages = analysis
        .pages
        .into_iter()
        .map(|page| PageResult {
            page: page.page_number,
            items: page
                .words
                .into_iter()
                .filter_map(|word| {
                    let text = word.content.trim();
                    if text.is_empty() || word.confidence < min_confidence {
                        return None;
                    }
                    let bbox = word
                        .polygon
                        .chunks_exact(2)
                        .map(|pt| [pt[0], pt[1]])
                        .collect();
                    Some(TextItem::new(text, word.confidence, bbox))
                })
                .collect(),
        })
        .collect();
    ExtractionResult::new(pages)
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    status: String,
    #[serde(rename = "analyzeResult")]
    analyze_result: Option<AnalyzeResult>,
}

#[derive(Deserialize, Default)]
struct AnalyzeResult {
    #[serde(default)]
    pages: Vec<AnalyzedPage>,
}

#[derive(Deserialize)]
struct AnalyzedPage {
    #[serde(rename = "pageNumber")]
    page_number: u32,
    #[serde(default)]
    words: Vec<AnalyzedWord>,
}

#[derive(Deserialize)]
struct AnalyzedWord {
    content: String,
    #[serde(default)]
    polygon: Vec<f32>,
    confidence: f32,
}
