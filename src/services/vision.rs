//! Photo classification and stock analysis through Gemini

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    config::VisionConfig,
    error::{AppError, AppResult},
    models::{
        classification::Classification,
        enums::{Condition, EquipmentType},
    },
};

/// Guesses type and wear from a photo
#[async_trait]
pub trait VisionClassifier: Send + Sync {
    async fn classify(&self, image: &[u8], mime_type: &str) -> AppResult<Classification>;
}

/// Free-text reading of the stock, for the dashboard
#[async_trait]
pub trait StockAnalyst: Send + Sync {
    async fn analyze(&self, inventory_json: &str) -> AppResult<String>;
}

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[a-zA-Z]*").expect("static regex"));

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    Image {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Deserialize)]
struct ReplyPart {
    text: Option<String>,
}

/// What the model is asked to answer for a photo
#[derive(Debug, Deserialize)]
struct RawClassification {
    #[serde(rename = "type")]
    equipment_type: Option<String>,
    condition: Option<String>,
    confidence: Option<f32>,
}

/// Gemini `generateContent` client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &VisionConfig) -> AppResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AppError::Vision("No API key configured".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    async fn generate(&self, request: &GenerateRequest) -> AppResult<String> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        tracing::debug!("Calling {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Vision(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Gemini returned {}: {}", status, body);
            return Err(AppError::Vision(format!("HTTP {}", status)));
        }

        let reply: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Vision(format!("Unreadable reply: {}", e)))?;

        reply
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::Vision("Empty reply".to_string()))
    }
}

#[async_trait]
impl VisionClassifier for GeminiClient {
    async fn classify(&self, image: &[u8], mime_type: &str) -> AppResult<Classification> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Image {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data: STANDARD.encode(image),
                        },
                    },
                    Part::Text {
                        text: classification_prompt(),
                    },
                ],
            }],
            generation_config: Some(GenerationConfig { temperature: 0.4 }),
        };

        let text = self.generate(&request).await?;
        let result = parse_classification(&text)?;
        tracing::info!(
            "Photo classified as {:?} ({:?}), confidence {:.2}",
            result.equipment_type,
            result.condition,
            result.confidence
        );
        Ok(result)
    }
}

#[async_trait]
impl StockAnalyst for GeminiClient {
    async fn analyze(&self, inventory_json: &str) -> AppResult<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part::Text {
                    text: analysis_prompt(inventory_json),
                }],
            }],
            generation_config: None,
        };
        self.generate(&request).await
    }
}

fn classification_prompt() -> String {
    let labels: Vec<&str> = EquipmentType::ALL.iter().map(|t| t.label()).collect();
    format!(
        "Analyse cette image d'équipement de pompier.\n\
         Identifie le type d'équipement parmi cette liste exacte : {}.\n\
         Estime aussi l'état général (Neuf, Bon, Usé, Critique).\n\
         Réponds UNIQUEMENT au format JSON :\n\
         {{\"type\": \"Nom exact de la liste\", \"condition\": \"État estimé\", \"confidence\": 0.95}}",
        labels.join(", ")
    )
}

fn analysis_prompt(inventory_json: &str) -> String {
    format!(
        "Agis comme un responsable logistique de caserne de pompiers.\n\
         Voici l'export JSON de notre stock actuel (t = type, s = statut, c = état) :\n\
         {}\n\n\
         Fournis une analyse concise (3 points maximum) sur :\n\
         1. Les équipements critiques manquants ou en faible quantité (statut 'Disponible').\n\
         2. Le pourcentage de matériel hors service.\n\
         3. Une recommandation prioritaire.\n\
         Utilise un ton professionnel et direct.",
        inventory_json
    )
}

/// Read the model's JSON answer, tolerating markdown fences and loose labels
pub fn parse_classification(text: &str) -> AppResult<Classification> {
    let cleaned = CODE_FENCE.replace_all(text, "");
    let raw: RawClassification = serde_json::from_str(cleaned.trim())
        .map_err(|e| AppError::Vision(format!("Unexpected classification format: {}", e)))?;

    Ok(Classification {
        equipment_type: raw.equipment_type.and_then(|t| t.parse().ok()),
        condition: raw.condition.and_then(|c| c.parse::<Condition>().ok()),
        confidence: raw.confidence.unwrap_or(0.0).clamp(0.0, 1.0),
    })
}
