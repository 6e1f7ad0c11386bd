// ==================== IMAGE UPLOADS ====================
// Images arrive inside JSON bodies as data URLs (or bare base64), are
// checked here and pushed to the external file host, which answers with a
// public URL that is stored in the sheet.

use crate::{config::AppConfig, utils::error::AppError};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use std::time::Duration;

#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Stores the image and returns its public URL.
    async fn upload(&self, name: &str, image: &DecodedImage) -> Result<String, AppError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

impl DecodedImage {
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF8") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

/// Decodes a `data:image/...;base64,` URL or bare base64 payload.
pub fn decode_image(input: &str, max_bytes: usize) -> Result<DecodedImage, AppError> {
    let trimmed = input.trim();
    let payload = match trimmed.strip_prefix("data:") {
        Some(rest) => {
            let (meta, data) = rest
                .split_once(',')
                .ok_or_else(|| AppError::InvalidRequest("malformed image data URL".to_string()))?;
            if !meta.ends_with(";base64") {
                return Err(AppError::InvalidRequest("image data URL must be base64".to_string()));
            }
            data
        }
        None => trimmed,
    };

    // Rough pre-check so oversized payloads are not decoded at all
    if payload.len() / 4 * 3 > max_bytes + 3 {
        return Err(AppError::InvalidRequest(format!("image exceeds {} bytes", max_bytes)));
    }

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| AppError::InvalidRequest(format!("image is not valid base64: {}", e)))?;

    if bytes.len() > max_bytes {
        return Err(AppError::InvalidRequest(format!("image exceeds {} bytes", max_bytes)));
    }

    let mime = sniff_mime(&bytes).ok_or_else(|| {
        AppError::InvalidRequest("image must be a PNG, JPEG, GIF or WebP file".to_string())
    })?;

    Ok(DecodedImage { bytes, mime })
}

/// Decodes and uploads an optional image field.
pub async fn upload_optional(
    host: &dyn ImageHost,
    config: &AppConfig,
    name: &str,
    input: Option<&str>,
) -> Result<Option<String>, AppError> {
    match input.map(str::trim).filter(|i| !i.is_empty()) {
        Some(data) => {
            let image = decode_image(data, config.max_image_bytes)?;
            let url = host.upload(name, &image).await?;
            log::info!("🖼️ Uploaded image '{}' ({} bytes)", name, image.bytes.len());
            Ok(Some(url))
        }
        None => Ok(None),
    }
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: UploadData,
}

/// imgbb-compatible upload API
pub struct HttpImageHost {
    client: reqwest::Client,
    url: String,
    key: Option<String>,
}

impl HttpImageHost {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        if config.image_host_key.is_none() {
            log::warn!("⚠️  IMAGE_HOST_KEY not set, image uploads are disabled");
        }

        Ok(Self {
            client,
            url: config.image_host_url.clone(),
            key: config.image_host_key.clone(),
        })
    }
}

#[async_trait]
impl ImageHost for HttpImageHost {
    async fn upload(&self, name: &str, image: &DecodedImage) -> Result<String, AppError> {
        let key = self
            .key
            .as_deref()
            .ok_or_else(|| AppError::Unavailable("image uploads are not configured".to_string()))?;

        let encoded = image.to_base64();
        let response = self
            .client
            .post(&self.url)
            .form(&[("key", key), ("name", name), ("image", encoded.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            log::error!("❌ Image host rejected upload '{}': {}", name, status);
            return Err(AppError::Upstream(format!("image host returned {}", status)));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse image host response: {}", e)))?;

        Ok(body.data.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

    #[test]
    fn test_decode_data_url() {
        let data_url = format!("data:image/png;base64,{}", STANDARD.encode(PNG));
        let image = decode_image(&data_url, 1024).unwrap();
        assert_eq!(image.mime, "image/png");
        assert_eq!(image.bytes, PNG);
    }

    #[test]
    fn test_decode_bare_base64_jpeg() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3];
        let image = decode_image(&STANDARD.encode(jpeg), 1024).unwrap();
        assert_eq!(image.mime, "image/jpeg");
    }

    #[test]
    fn test_rejects_non_images_and_oversized() {
        let text = STANDARD.encode(b"hello world");
        assert!(matches!(decode_image(&text, 1024), Err(AppError::InvalidRequest(_))));

        let mut big = PNG.to_vec();
        big.resize(4096, 0);
        assert!(decode_image(&STANDARD.encode(&big), 1024).is_err());

        assert!(decode_image("data:image/png,plain", 1024).is_err());
        assert!(decode_image("not base64 !!", 1024).is_err());
    }

    #[tokio::test]
    async fn test_upload_without_key_is_unavailable() {
        let config = AppConfig::for_tests();
        let host = HttpImageHost::new(&config).unwrap();
        let data_url = format!("data:image/png;base64,{}", STANDARD.encode(PNG));

        let result = upload_optional(&host, &config, "logo", Some(&data_url)).await;
        assert!(matches!(result, Err(AppError::Unavailable(_))));

        let none = upload_optional(&host, &config, "logo", Some("  ")).await.unwrap();
        assert!(none.is_none());
    }
}
