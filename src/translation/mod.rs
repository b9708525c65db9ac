//! 翻译模块
//!
//! - **engine**: 引擎适配器与就绪状态机，定义 `Translator` / `EngineLoader` 接口
//! - **backend**: 基于 HTTP 推理服务的加载器与翻译器
//! - **languages**: 语言代码映射与是否需要翻译的判定
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use babel_proxy::translation::{HttpModelLoader, TranslationEngine};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = Arc::new(TranslationEngine::new("/tmp/babel-proxy", Duration::from_secs(60)));
//! let loader = HttpModelLoader::new("http://localhost:7860", Duration::from_secs(30))?;
//! engine.initialize(Arc::new(loader));
//!
//! // 加载完成前返回 EngineNotReady
//! let translated = engine.translate("Hello", "fra_Latn", Some("eng_Latn")).await;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod engine;
pub mod error;
pub mod languages;

pub use backend::{HttpModelLoader, HttpTranslator, ModelManifest};
pub use engine::{
    EngineLoader, EnginePhase, EngineState, EngineStatus, TranslationEngine, Translator,
};
pub use error::{ErrorSeverity, TranslationError, TranslationResult};
pub use languages::LanguageMapper;
