//! Google Cloud Vision recognition provider.
//!
//! Calls `files:annotate` with DOCUMENT_TEXT_DETECTION over inline base64
//! PDF content, authenticating with a service account key via the RS256
//! JWT → OAuth2 token exchange. The access token is cached until shortly
//! before expiry.

use std::path::Path;
use std::sync::{Arc, Mutex};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use tracing::{debug, info};

use super::{
    AnnotatedBlock, AnnotatedPage, AnnotatedParagraph, AnnotatedSymbol, AnnotatedWord,
    BoundingPoly, DocumentAnnotation, RecognitionError, RecognitionProvider, Vertex,
};

const VISION_SCOPE: &str = "https://www.googleapis.com/auth/cloud-vision";
const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ANNOTATE_URI: &str = "https://vision.googleapis.com/v1/files:annotate";

#[derive(Clone, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: u64,
}

pub struct VisionProvider {
    client: reqwest::Client,
    sa_key: ServiceAccountKey,
    token_cache: Arc<Mutex<Option<CachedToken>>>,
}

impl VisionProvider {
    /// Build a provider from a service account key file. Fails fast when
    /// the key file is unreadable or unparseable.
    pub fn from_key_file(client: reqwest::Client, path: &Path) -> Result<Self, RecognitionError> {
        let key_json = std::fs::read_to_string(path).map_err(|e| {
            RecognitionError::Credentials(format!(
                "service account key {} unreadable: {}",
                path.display(),
                e
            ))
        })?;

        let sa_key: ServiceAccountKey = serde_json::from_str(&key_json).map_err(|e| {
            RecognitionError::Credentials(format!(
                "service account key {} invalid: {}",
                path.display(),
                e
            ))
        })?;

        info!("Vision provider initialized for {}", sa_key.client_email);
        Ok(Self {
            client,
            sa_key,
            token_cache: Arc::new(Mutex::new(None)),
        })
    }

    /// Get a valid OAuth2 access token, refreshing if expired.
    async fn access_token(&self) -> Result<String, RecognitionError> {
        {
            let cache = self.token_cache.lock().unwrap();
            if let Some(ref cached) = *cache {
                if now_secs() < cached.expires_at.saturating_sub(60) {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let now = now_secs();
        let claims = serde_json::json!({
            "iss": self.sa_key.client_email,
            "scope": VISION_SCOPE,
            "aud": TOKEN_URI,
            "iat": now,
            "exp": now + 3600,
        });

        let header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256);
        let encoding_key =
            jsonwebtoken::EncodingKey::from_rsa_pem(self.sa_key.private_key.as_bytes())
                .map_err(|e| {
                    RecognitionError::Credentials(format!("invalid RSA private key: {}", e))
                })?;
        let jwt = jsonwebtoken::encode(&header, &claims, &encoding_key)
            .map_err(|e| RecognitionError::Credentials(format!("failed to encode JWT: {}", e)))?;

        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
            expires_in: u64,
        }

        let resp = self
            .client
            .post(TOKEN_URI)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", &jwt),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(RecognitionError::Service(format!(
                "token exchange failed ({}): {}",
                status, body
            )));
        }

        let token: TokenResponse = resp.json().await?;

        {
            let mut cache = self.token_cache.lock().unwrap();
            *cache = Some(CachedToken {
                access_token: token.access_token.clone(),
                expires_at: now + token.expires_in,
            });
        }

        Ok(token.access_token)
    }
}

#[async_trait::async_trait]
impl RecognitionProvider for VisionProvider {
    fn name(&self) -> &str {
        "google_vision"
    }

    async fn annotate(
        &self,
        filename: &str,
        data: &[u8],
    ) -> Result<DocumentAnnotation, RecognitionError> {
        let token = self.access_token().await?;

        let body = serde_json::json!({
            "requests": [{
                "inputConfig": {
                    "content": BASE64.encode(data),
                    "mimeType": "application/pdf",
                },
                "features": [{ "type": "DOCUMENT_TEXT_DETECTION" }],
            }]
        });

        debug!("Vision annotate: {} ({} bytes)", filename, data.len());
        let resp = self
            .client
            .post(ANNOTATE_URI)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(RecognitionError::Service(format!(
                "files:annotate returned {}: {}",
                status, text
            )));
        }

        let annotated: BatchAnnotateFilesResponse = resp.json().await?;
        let file = annotated
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| RecognitionError::Malformed("no file response".into()))?;

        let mut full_text = String::new();
        let mut pages = Vec::new();

        for page_resp in file.responses {
            if let Some(err) = page_resp.error {
                return Err(RecognitionError::Service(err.message));
            }
            let Some(annotation) = page_resp.full_text_annotation else {
                continue;
            };
            full_text.push_str(&annotation.text);
            full_text.push('\n');
            for page in annotation.pages {
                pages.push(convert_page(page));
            }
        }

        info!(
            "Vision annotate complete: {} ({} pages, {} chars)",
            filename,
            pages.len(),
            full_text.len()
        );

        Ok(DocumentAnnotation { full_text, pages })
    }
}

// ── Vision API wire types (private deserialization types) ───────────────────

#[derive(Deserialize)]
struct BatchAnnotateFilesResponse {
    #[serde(default)]
    responses: Vec<AnnotateFileResponse>,
}

#[derive(Deserialize)]
struct AnnotateFileResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    full_text_annotation: Option<WireTextAnnotation>,
    #[serde(default)]
    error: Option<WireStatus>,
}

#[derive(Deserialize)]
struct WireStatus {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct WireTextAnnotation {
    #[serde(default)]
    text: String,
    #[serde(default)]
    pages: Vec<WirePage>,
}

#[derive(Deserialize)]
struct WirePage {
    #[serde(default)]
    blocks: Vec<WireBlock>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBlock {
    #[serde(default)]
    bounding_box: WirePoly,
    #[serde(default)]
    paragraphs: Vec<WireParagraph>,
}

#[derive(Deserialize)]
struct WireParagraph {
    #[serde(default)]
    words: Vec<WireWord>,
}

#[derive(Deserialize)]
struct WireWord {
    #[serde(default)]
    symbols: Vec<WireSymbol>,
}

#[derive(Deserialize)]
struct WireSymbol {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize, Default)]
struct WirePoly {
    #[serde(default)]
    vertices: Vec<WireVertex>,
}

// Vision omits zero-valued coordinates.
#[derive(Deserialize)]
struct WireVertex {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
}

fn convert_page(page: WirePage) -> AnnotatedPage {
    AnnotatedPage {
        blocks: page
            .blocks
            .into_iter()
            .map(|b| AnnotatedBlock {
                bounding_box: BoundingPoly {
                    vertices: b
                        .bounding_box
                        .vertices
                        .into_iter()
                        .map(|v| Vertex { x: v.x, y: v.y })
                        .collect(),
                },
                paragraphs: b
                    .paragraphs
                    .into_iter()
                    .map(|p| AnnotatedParagraph {
                        words: p
                            .words
                            .into_iter()
                            .map(|w| AnnotatedWord {
                                symbols: w
                                    .symbols
                                    .into_iter()
                                    .map(|s| AnnotatedSymbol { text: s.text })
                                    .collect(),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}
