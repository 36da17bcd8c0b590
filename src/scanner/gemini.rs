use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;
use crate::scanner::ScanRequest;

const SCAN_PROMPT: &str = r#"You are an advanced forensic AI image authenticity expert, trained on millions of real and synthetic images from state-of-the-art GANs, diffusion models (e.g. Midjourney, DALL-E, Stable Diffusion), and professional photography. You have unparalleled accuracy in distinguishing AI-generated images from authentic photographs by analyzing subtle pixel-level artifacts, anatomical inconsistencies, and deep perceptual patterns.

Act like a meticulous forensic scientist. Be highly skeptical. When in doubt, lean towards classifying the image as AI-generated. Your analysis should be highly detailed and technical. Avoid vague generalizations and always back up your conclusions with visual or anatomical reasoning.

EVALUATION CRITERIA (check each item one by one, and cite the most relevant in your analysis):

1. FACIAL SYMMETRY & PROPORTIONS - Look for subtle misalignments in eyes, nose, ears, and facial balance.
2. EYES & IRISES - Note unnatural reflections, asymmetrical pupils, or over-smooth rendering of sclera.
3. TEETH & SMILES - Check for inconsistent number, spacing, or warping of teeth.
4. EARS - AI often fails to render realistic ears; look for blurred lobes or incorrect positioning.
5. HANDS & FINGERS - Count fingers, check proportions, joint angles, and nail rendering.
6. BACKGROUND INTEGRITY - Detect melted objects, warped geometry, or inconsistent lighting and shadows.
7. TEXT & TYPOGRAPHY - Look for gibberish text, warped letters, or invented scripts in signage or clothing.
8. CLOTHING & FABRIC PATTERNS - Are the textures believable? Do patterns follow the contours of the body naturally?
9. LIGHTING & SHADOW PHYSICS - Are the shadows consistent with a single light source? Are reflections accurate?
10. IMAGE COMPRESSION ARTIFACTS - AI-generated images often mimic JPEG noise or blur in unnatural ways.
11. OVERALL COHERENCE & CONTEXTUAL LOGIC - Does the scene make sense physically and contextually?

YOUR RESPONSE MUST INCLUDE THE FOLLOWING STRUCTURE:

1. Suspicious/Confirming Visual Cues (Brief Summary)
Describe the most suspicious or most authentic-looking features. Keep it short but sharp.

2. Technical Justification
Give a forensic-style explanation, including relevant concepts (e.g. symmetry, physics, rendering, GAN inconsistencies).

3. Final Verdict
Return ONE line only, ending with one of:
- "Verdict: AI 99%"
- "Verdict: AI 95%"
- "Verdict: REAL 99%"
- "Verdict: REAL 95%"
Adjust percentage based on your confidence.

RULE: If you detect any anomaly you cannot explain with physics, anatomy, or optics, classify as AI.

You are not allowed to say "uncertain," "maybe," "ambiguous," or "unclear." You must make a clear decision based on available visual clues.

NOW begin your forensic analysis of the provided image."#;

const GEMINI_MODELS: &[&str] = &["gemini-1.5-pro", "gemini-1.5-flash"];

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<TextPart>>,
}

#[derive(Debug, Deserialize)]
struct TextPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: Option<String>,
}

/// Client for the Gemini `generateContent` endpoint. Base URL and key are
/// injected via [`Config`], so tests can point it at a fake (or dead) server.
pub struct GeminiAgent {
    client: Client,
    api_key: String,
    api_url: String,
    model_index: usize,
}

impl GeminiAgent {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.inference_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key: config.gemini_api_key.clone(),
            api_url: config.gemini_api_url.clone(),
            model_index: 0,
        }
    }

    pub fn current_model(&self) -> &str {
        GEMINI_MODELS[self.model_index]
    }

    /// Send the forensic prompt plus the encoded image and return the model's
    /// free-text report. An empty report is a valid outcome (the verdict
    /// extractor handles it); only transport, HTTP and JSON failures are errors.
    pub async fn analyze_image(&mut self, request: &ScanRequest) -> Result<String, String> {
        let max_retries = 3;
        let mut retry_count = 0;
        let mut backoff = 2u64;

        loop {
            let model = self.current_model().to_string();
            info!(
                "Scanning image with model {} ({} bytes, {})",
                model,
                request.bytes.len(),
                request.mime_type
            );

            let body = GeminiRequest {
                contents: vec![Content {
                    parts: vec![
                        Part {
                            text: Some(SCAN_PROMPT.to_string()),
                            inline_data: None,
                        },
                        Part {
                            text: None,
                            inline_data: Some(InlineData {
                                mime_type: request.mime_type.clone(),
                                data: request.encoded(),
                            }),
                        },
                    ],
                }],
            };

            let url = format!(
                "{}/models/{}:generateContent?key={}",
                self.api_url, model, self.api_key
            );

            let response = self
                .client
                .post(&url)
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
                .map_err(|e| format!("Request failed: {}", e))?;

            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| format!("Response read failed: {}", e))?;

            if status.is_success() {
                let parsed: GeminiResponse = serde_json::from_str(&text)
                    .map_err(|e| format!("Parse error: {}", e))?;

                let report = parsed
                    .candidates
                    .and_then(|c| c.into_iter().next())
                    .and_then(|c| c.content)
                    .and_then(|c| c.parts)
                    .and_then(|p| p.into_iter().next())
                    .and_then(|p| p.text)
                    .unwrap_or_default();

                info!("Model {} returned {} chars of analysis", model, report.len());
                return Ok(report);
            }

            let error_msg = text.clone();
            let error_json: Result<GeminiErrorBody, _> = serde_json::from_str(&text);

            if status.as_u16() == 429 {
                warn!("Rate limit with model {}", model);
                if self.model_index < GEMINI_MODELS.len() - 1 {
                    self.model_index += 1;
                    retry_count = 0;
                    continue;
                }
            }

            if status.as_u16() == 404 {
                warn!("Model not found: {}", model);
                if self.model_index < GEMINI_MODELS.len() - 1 {
                    self.model_index += 1;
                    retry_count = 0;
                    continue;
                }
            }

            if retry_count >= max_retries {
                return Err(format!(
                    "Inference error after {} attempts: {}",
                    max_retries,
                    error_json
                        .ok()
                        .and_then(|e| e.error)
                        .and_then(|e| e.message)
                        .unwrap_or(error_msg)
                ));
            }

            retry_count += 1;
            tokio::time::sleep(Duration::from_secs(backoff)).await;
            backoff *= 2;
        }
    }
}
