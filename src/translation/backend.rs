//! 基于 HTTP 的推理服务后端
//!
//! 推理服务对外提供两个接口：
//!
//! - `GET {api_url}/model` 返回模型清单 `{"model": "...", "languages": [...]}`
//! - `POST {api_url}/translate`，请求 `{"text", "target", "source"?}`，返回 `{"translation"}`
//!
//! 首次加载成功后模型清单会写入缓存目录，之后启动时直接读取缓存，跳过网络探测。

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::translation::engine::{EngineLoader, Translator};
use crate::translation::error::{helpers::service_error, TranslationError, TranslationResult};

/// 缓存目录中的模型清单文件名
pub const MANIFEST_FILE_NAME: &str = "model-manifest.json";

/// 推理服务的模型清单
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelManifest {
    /// 模型名称
    pub model: String,
    /// 模型支持的引擎语言代码
    #[serde(default)]
    pub languages: Vec<String>,
}

impl ModelManifest {
    /// 模型是否声明支持该语言；清单未列出语言时视为全部支持
    pub fn supports(&self, engine_code: &str) -> bool {
        self.languages.is_empty()
            || self
                .languages
                .iter()
                .any(|lang| lang.eq_ignore_ascii_case(engine_code))
    }
}

/// 请求体
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
}

/// 响应体
#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translation: String,
}

/// 从推理服务加载模型清单
pub struct HttpModelLoader {
    client: reqwest::Client,
    api_url: String,
}

impl HttpModelLoader {
    pub fn new(api_url: &str, request_timeout: Duration) -> TranslationResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| TranslationError::EngineLoadFailed(e.to_string()))?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    fn manifest_path(cache_dir: &Path) -> PathBuf {
        cache_dir.join(MANIFEST_FILE_NAME)
    }

    /// 读取缓存的清单；不存在或损坏时返回 `None`
    async fn read_cached_manifest(path: &Path) -> Option<ModelManifest> {
        let content = tokio::fs::read(path).await.ok()?;
        match serde_json::from_slice(&content) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                tracing::warn!("缓存的模型清单 {} 无法解析，将重新获取: {}", path.display(), e);
                None
            }
        }
    }

    async fn fetch_manifest(&self) -> TranslationResult<ModelManifest> {
        let response = self
            .client
            .get(format!("{}/model", self.api_url))
            .send()
            .await
            .map_err(|e| TranslationError::EngineLoadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::EngineLoadFailed(format!(
                "inference server answered {} for the model manifest",
                status
            )));
        }

        response
            .json::<ModelManifest>()
            .await
            .map_err(|e| TranslationError::EngineLoadFailed(e.to_string()))
    }
}

#[async_trait]
impl EngineLoader for HttpModelLoader {
    async fn load(&self, cache_dir: &Path) -> TranslationResult<Arc<dyn Translator>> {
        let path = Self::manifest_path(cache_dir);

        let manifest = match Self::read_cached_manifest(&path).await {
            Some(manifest) => {
                tracing::info!("从缓存加载模型清单: {}", path.display());
                manifest
            }
            None => {
                let manifest = self.fetch_manifest().await?;
                tokio::fs::write(&path, serde_json::to_vec_pretty(&manifest)?).await?;
                tracing::info!("模型清单已写入缓存: {}", path.display());
                manifest
            }
        };

        tracing::info!(
            model = %manifest.model,
            languages = manifest.languages.len(),
            "推理模型可用"
        );

        Ok(Arc::new(HttpTranslator {
            client: self.client.clone(),
            api_url: self.api_url.clone(),
            manifest,
        }))
    }
}

/// 调用推理服务的翻译器
pub struct HttpTranslator {
    client: reqwest::Client,
    api_url: String,
    manifest: ModelManifest,
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: Option<&str>,
    ) -> TranslationResult<String> {
        if !self.manifest.supports(target_lang) {
            tracing::debug!("模型 {} 未声明支持 {}", self.manifest.model, target_lang);
        }

        let response = self
            .client
            .post(format!("{}/translate", self.api_url))
            .json(&TranslateRequest {
                text,
                target: target_lang,
                source: source_lang,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(service_error(format!("{}: {}", status, body.trim())));
        }

        Ok(response.json::<TranslateResponse>().await?.translation)
    }
}
