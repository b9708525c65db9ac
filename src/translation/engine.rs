//! 翻译引擎适配器
//!
//! [`TranslationEngine`] 是进程内唯一的、构建代价高的长期资源：启动时调用一次
//! [`TranslationEngine::initialize`] 在后台加载，加载期间 HTTP 服务照常启动，
//! 翻译请求会立即以 [`TranslationError::EngineNotReady`] 失败而不是排队等待。
//!
//! 状态流转：`NotLoaded → Loading → Ready | LoadFailed`。`LoadFailed` 是终态，不会自动重试。
//!
//! 剩余时间估计只是基于固定预估时长的倒计时，与真实加载进度无关。

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::translation::error::{helpers::log_error, TranslationError, TranslationResult};

/// 已加载的翻译能力
#[async_trait]
pub trait Translator: Send + Sync {
    /// 翻译一段纯文本
    ///
    /// `target_lang` 与 `source_lang` 均为引擎代码；`source_lang` 为 `None` 时由引擎自动识别。
    async fn translate(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: Option<&str>,
    ) -> TranslationResult<String>;
}

/// 引擎加载器，负责准备模型并把可复用的产物写入缓存目录
#[async_trait]
pub trait EngineLoader: Send + Sync {
    async fn load(&self, cache_dir: &Path) -> TranslationResult<Arc<dyn Translator>>;
}

/// 引擎生命周期状态
#[derive(Clone)]
pub enum EngineState {
    NotLoaded,
    Loading { started_at: Instant },
    Ready(Arc<dyn Translator>),
    LoadFailed(String),
}

/// 对外暴露的阶段名称
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnginePhase {
    NotLoaded,
    Loading,
    Ready,
    Failed,
}

/// 可轮询的引擎状态
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStatus {
    pub ready: bool,
    /// 预计剩余秒数（启发式）
    pub remaining: f64,
    pub state: EnginePhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 翻译引擎适配器
pub struct TranslationEngine {
    state: RwLock<EngineState>,
    estimated_duration: Duration,
    cache_dir: PathBuf,
}

impl TranslationEngine {
    /// 创建尚未加载的引擎
    pub fn new(cache_dir: impl Into<PathBuf>, estimated_duration: Duration) -> Self {
        Self {
            state: RwLock::new(EngineState::NotLoaded),
            estimated_duration,
            cache_dir: cache_dir.into(),
        }
    }

    /// 直接用已就绪的翻译器创建引擎
    pub fn ready(translator: Arc<dyn Translator>) -> Self {
        Self {
            state: RwLock::new(EngineState::Ready(translator)),
            estimated_duration: Duration::ZERO,
            cache_dir: PathBuf::new(),
        }
    }

    /// 在后台开始加载引擎，只会生效一次
    ///
    /// 返回加载任务的句柄；重复调用返回 `None`。
    pub fn initialize(self: &Arc<Self>, loader: Arc<dyn EngineLoader>) -> Option<JoinHandle<()>> {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if !matches!(*state, EngineState::NotLoaded) {
                tracing::warn!("翻译引擎已初始化过，忽略重复的 initialize 调用");
                return None;
            }
            *state = EngineState::Loading {
                started_at: Instant::now(),
            };
        }

        tracing::info!(
            cache_dir = %self.cache_dir.display(),
            estimated_secs = self.estimated_duration.as_secs(),
            "开始加载翻译引擎"
        );

        let engine = Arc::clone(self);
        Some(tokio::spawn(async move {
            let result = engine.run_loader(loader.as_ref()).await;
            engine.finish_loading(result);
        }))
    }

    async fn run_loader(&self, loader: &dyn EngineLoader) -> TranslationResult<Arc<dyn Translator>> {
        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| {
                TranslationError::EngineLoadFailed(format!(
                    "cannot create cache directory {}: {}",
                    self.cache_dir.display(),
                    e
                ))
            })?;

        loader.load(&self.cache_dir).await
    }

    fn finish_loading(&self, result: TranslationResult<Arc<dyn Translator>>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        match result {
            Ok(translator) => {
                if let EngineState::Loading { started_at } = *state {
                    tracing::info!("翻译引擎加载完成，耗时 {:?}", started_at.elapsed());
                }
                *state = EngineState::Ready(translator);
            }
            Err(e) => {
                log_error(&e, "翻译引擎加载失败，本进程内翻译不可用");
                *state = EngineState::LoadFailed(e.to_string());
            }
        }
    }

    /// 引擎是否可用
    pub fn is_ready(&self) -> bool {
        matches!(
            *self.state.read().unwrap_or_else(PoisonError::into_inner),
            EngineState::Ready(_)
        )
    }

    /// 预计剩余加载秒数：`max(0, 预估时长 - 已加载时长)`
    ///
    /// 这是固定的倒计时，不反映真实进度。尚未开始时返回完整预估，就绪或失败后返回 0。
    pub fn estimated_seconds_remaining(&self) -> f64 {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match *state {
            EngineState::NotLoaded => self.estimated_duration.as_millis() as f64 / 1000.0,
            EngineState::Loading { started_at } => {
                let elapsed_ms = started_at.elapsed().as_millis();
                let remaining_ms = self.estimated_duration.as_millis().saturating_sub(elapsed_ms);
                remaining_ms as f64 / 1000.0
            }
            EngineState::Ready(_) | EngineState::LoadFailed(_) => 0.0,
        }
    }

    /// 当前状态快照
    pub fn status(&self) -> EngineStatus {
        let remaining = self.estimated_seconds_remaining();
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let (phase, error) = match &*state {
            EngineState::NotLoaded => (EnginePhase::NotLoaded, None),
            EngineState::Loading { .. } => (EnginePhase::Loading, None),
            EngineState::Ready(_) => (EnginePhase::Ready, None),
            EngineState::LoadFailed(reason) => (EnginePhase::Failed, Some(reason.clone())),
        };

        EngineStatus {
            ready: phase == EnginePhase::Ready,
            remaining,
            state: phase,
            error,
        }
    }

    /// 获取已就绪的翻译器
    pub fn translator(&self) -> TranslationResult<Arc<dyn Translator>> {
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            EngineState::Ready(translator) => Ok(Arc::clone(translator)),
            EngineState::NotLoaded | EngineState::Loading { .. } => {
                Err(TranslationError::EngineNotReady)
            }
            EngineState::LoadFailed(reason) => {
                Err(TranslationError::EngineUnavailable(reason.clone()))
            }
        }
    }

    /// 翻译文本
    pub async fn translate(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: Option<&str>,
    ) -> TranslationResult<String> {
        let translator = self.translator()?;
        translator.translate(text, target_lang, source_lang).await
    }
}
