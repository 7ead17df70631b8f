use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use reqwest::Client;
use serde::Deserialize;

use crate::application::ports::{ExtractionError, Extractor};
use crate::domain::{ExtractionOptions, ExtractionResult, PageResult, TextItem};

use super::pdf_rasterizer::rasterize_pages;

pub const RASTERIZE_TIMEOUT: Duration = Duration::from_secs(300);
pub const VLM_TIMEOUT: Duration = Duration::from_secs(300);

/// Confidence reported for VLM lines; the model gives no per-line score.
const VLM_LINE_CONFIDENCE: f32 = 1.0;

/// Rasterizes PDF pages locally and transcribes each one with a vision
/// model behind an OpenAI-compatible chat completions endpoint.
pub struct VlmPdfAdapter {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl VlmPdfAdapter {
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Result<Self, ExtractionError> {
        let client = Client::builder()
            .timeout(VLM_TIMEOUT)
            .build()
            .map_err(|e| ExtractionError::Unavailable(format!("http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn prompt(languages: &[String]) -> String {
        format!(
            "Transcribe all text visible on this page. The text may be in these languages \
             (EasyOCR codes): {}. Output one line of plain text per visual line, in reading \
             order. Output only the transcription.",
            languages.join(", ")
        )
    }

    async fn transcribe_page(
        &self,
        png_bytes: &[u8],
        page: u32,
        prompt: &str,
    ) -> Result<String, ExtractionError> {
        let b64 = general_purpose::STANDARD.encode(png_bytes);
        let data_uri = format!("data:image/png;base64,{b64}");

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        { "type": "image_url", "image_url": { "url": data_uri } },
                        { "type": "text", "text": prompt }
                    ]
                }
            ],
            "max_tokens": 2048,
            "temperature": 0.0,
            "stream": false
        });

        let url = format!("{}/v1/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| ExtractionError::Failed(format!("VLM request page {page}: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Failed(format!(
                "VLM returned {status} for page {page}: {text}"
            )));
        }

        let completion: ChatCompletion = response.json().await.map_err(|e| {
            ExtractionError::Failed(format!("VLM response parse error page {page}: {e}"))
        })?;

        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

fn page_items(text: &str) -> Vec<TextItem> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| TextItem::new(line, VLM_LINE_CONFIDENCE, Vec::new()))
        .collect()
}

#[async_trait]
impl Extractor for VlmPdfAdapter {
    #[tracing::instrument(skip(self, document), fields(bytes = document.len(), model = %self.model))]
    async fn extract(
        &self,
        document: &[u8],
        options: &ExtractionOptions,
    ) -> Result<ExtractionResult, ExtractionError> {
        let data = document.to_vec();
        let dpi = options.dpi;

        let png_buffers = tokio::time::timeout(
            RASTERIZE_TIMEOUT,
            tokio::task::spawn_blocking(move || {
                std::panic::catch_unwind(|| rasterize_pages(&data, dpi)).unwrap_or_else(|_| {
                    Err(ExtractionError::Failed(
                        "OOM or panic during PDF rasterization".to_string(),
                    ))
                })
            }),
        )
        .await
        .map_err(|_| ExtractionError::Failed("PDF rasterization timed out".to_string()))?
        .map_err(|e| ExtractionError::Failed(format!("rasterizer task failed: {e}")))??;

        tracing::info!(page_count = png_buffers.len(), dpi, "PDF rasterized");

        let prompt = Self::prompt(&options.languages);
        let mut pages = Vec::with_capacity(png_buffers.len());
        for (index, png_bytes) in png_buffers.iter().enumerate() {
            let page = index as u32 + 1;
            let text = self.transcribe_page(png_bytes, page, &prompt).await?;
            let items = page_items(&text)
                .into_iter()
                .filter(|item| item.confidence >= options.min_confidence)
                .collect();
            pages.push(PageResult { page, items });
        }

        Ok(ExtractionResult::new(pages))
    }

    fn name(&self) -> &'static str {
        "vlm"
    }
}
