//! 语言代码映射
//!
//! 页面声明的语言通常是 BCP 47 标签（`en`, `en-US`, `zh-TW`），而翻译引擎使用
//! FLORES-200 形式的复合代码（`eng_Latn`, `zho_Hant`）。映射表是配置项：
//! 内置表只覆盖 [`DEFAULT_LANGUAGE_CODES`] 中列出的常用语言，配置文件中的条目会覆盖或扩展它，
//! 未映射的标签原样传给引擎。
//!
//! 判断是否需要翻译时宁可多翻也不漏翻：无法确定相同语言时一律翻译。

use std::collections::HashMap;

/// 内置映射表（小写标签 → 引擎代码）
pub const DEFAULT_LANGUAGE_CODES: &[(&str, &str)] = &[
    ("ar", "arb_Arab"),
    ("cs", "ces_Latn"),
    ("da", "dan_Latn"),
    ("de", "deu_Latn"),
    ("el", "ell_Grek"),
    ("en", "eng_Latn"),
    ("es", "spa_Latn"),
    ("fa", "pes_Arab"),
    ("fi", "fin_Latn"),
    ("fr", "fra_Latn"),
    ("he", "heb_Hebr"),
    ("hi", "hin_Deva"),
    ("hu", "hun_Latn"),
    ("id", "ind_Latn"),
    ("it", "ita_Latn"),
    ("ja", "jpn_Jpan"),
    ("ko", "kor_Hang"),
    ("nl", "nld_Latn"),
    ("no", "nob_Latn"),
    ("nb", "nob_Latn"),
    ("pl", "pol_Latn"),
    ("pt", "por_Latn"),
    ("ro", "ron_Latn"),
    ("ru", "rus_Cyrl"),
    ("sv", "swe_Latn"),
    ("th", "tha_Thai"),
    ("tr", "tur_Latn"),
    ("uk", "ukr_Cyrl"),
    ("vi", "vie_Latn"),
    ("zh", "zho_Hans"),
    ("zh-cn", "zho_Hans"),
    ("zh-hans", "zho_Hans"),
    ("zh-tw", "zho_Hant"),
    ("zh-hk", "zho_Hant"),
    ("zh-hant", "zho_Hant"),
];

/// 语言代码映射器
#[derive(Debug, Clone)]
pub struct LanguageMapper {
    table: HashMap<String, String>,
    skip_undetermined: bool,
}

impl Default for LanguageMapper {
    fn default() -> Self {
        Self::new(&HashMap::new(), false)
    }
}

impl LanguageMapper {
    /// 用内置表加上配置中的覆盖项创建映射器
    pub fn new(overrides: &HashMap<String, String>, skip_undetermined: bool) -> Self {
        let mut table: HashMap<String, String> = DEFAULT_LANGUAGE_CODES
            .iter()
            .map(|(tag, code)| (tag.to_string(), code.to_string()))
            .collect();

        for (tag, code) in overrides {
            table.insert(normalize_tag(tag), code.trim().to_string());
        }

        Self {
            table,
            skip_undetermined,
        }
    }

    /// 将语言标签映射为引擎代码；先查完整标签，再查主语言子标签，都没有则原样返回
    pub fn to_engine_code(&self, tag: &str) -> String {
        let normalized = normalize_tag(tag);

        if let Some(code) = self.table.get(&normalized) {
            return code.clone();
        }

        if let Some(code) = self.table.get(primary_subtag(&normalized)) {
            return code.clone();
        }

        tag.trim().to_string()
    }

    /// 页面语言作为源语言提示；未声明时为 `None`，交给引擎自动识别
    pub fn source_hint(&self, page_lang: Option<&str>) -> Option<String> {
        page_lang
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .map(|lang| self.to_engine_code(lang))
    }

    /// 判断页面是否需要翻译
    pub fn needs_translation(&self, page_lang: Option<&str>, target_lang: &str) -> bool {
        let Some(page_lang) = page_lang.map(str::trim).filter(|lang| !lang.is_empty()) else {
            // 未声明语言（undetermined）
            return !self.skip_undetermined;
        };

        let page_primary = primary_subtag(&normalize_tag(page_lang)).to_string();
        let target_primary = primary_subtag(&normalize_tag(target_lang)).to_string();
        if page_primary == target_primary {
            return false;
        }

        !self
            .to_engine_code(page_lang)
            .eq_ignore_ascii_case(&self.to_engine_code(target_lang))
    }
}

/// 小写并统一分隔符为 `-`
fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase().replace('_', "-")
}

/// 分隔符前的主语言子标签
fn primary_subtag(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_engine_code() {
        let mapper = LanguageMapper::default();

        assert_eq!(mapper.to_engine_code("fr"), "fra_Latn");
        assert_eq!(mapper.to_engine_code("FR"), "fra_Latn");
        assert_eq!(mapper.to_engine_code("en-US"), "eng_Latn");
        assert_eq!(mapper.to_engine_code("zh-TW"), "zho_Hant");
        assert_eq!(mapper.to_engine_code("zh_Hant"), "zho_Hant");
        assert_eq!(mapper.to_engine_code("zh"), "zho_Hans");

        // 未映射的标签原样返回
        assert_eq!(mapper.to_engine_code("tlh"), "tlh");
        assert_eq!(mapper.to_engine_code("fra_Latn"), "fra_Latn");
    }

    #[test]
    fn test_overrides_extend_and_replace_table() {
        let overrides = HashMap::from([
            ("pt-BR".to_string(), "por_Latn_BR".to_string()),
            ("fr".to_string(), "fr".to_string()),
        ]);
        let mapper = LanguageMapper::new(&overrides, false);

        assert_eq!(mapper.to_engine_code("pt-br"), "por_Latn_BR");
        assert_eq!(mapper.to_engine_code("pt"), "por_Latn");
        assert_eq!(mapper.to_engine_code("fr"), "fr");
        assert_eq!(mapper.table.len(), DEFAULT_LANGUAGE_CODES.len() + 1);
    }

    #[test]
    fn test_same_language_skips_translation() {
        let mapper = LanguageMapper::default();

        assert!(!mapper.needs_translation(Some("fr"), "fr"));
        assert!(!mapper.needs_translation(Some("en-US"), "en"));
        assert!(!mapper.needs_translation(Some("EN"), "en-GB"));
        // 目标语言已是引擎代码
        assert!(!mapper.needs_translation(Some("en"), "eng_Latn"));
        assert!(!mapper.needs_translation(Some("fr"), "fra_Latn"));
    }

    #[test]
    fn test_different_language_needs_translation() {
        let mapper = LanguageMapper::default();

        assert!(mapper.needs_translation(Some("en"), "fr"));
        assert!(mapper.needs_translation(Some("ja"), "eng_Latn"));
        // 无法识别的标签也会翻译
        assert!(mapper.needs_translation(Some("xx"), "fr"));
    }

    #[test]
    fn test_undetermined_language() {
        let mapper = LanguageMapper::default();
        assert!(mapper.needs_translation(None, "fr"));
        assert!(mapper.needs_translation(Some("  "), "fr"));
        assert_eq!(mapper.source_hint(None), None);
        assert_eq!(mapper.source_hint(Some("")), None);
        assert_eq!(mapper.source_hint(Some("de")), Some("deu_Latn".to_string()));

        let strict = LanguageMapper::new(&HashMap::new(), true);
        assert!(!strict.needs_translation(None, "fr"));
        assert!(strict.needs_translation(Some("en"), "fr"));
    }
}
