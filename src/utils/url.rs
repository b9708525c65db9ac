//! URL 工具函数
//!
//! 代理链接的格式为 `/proxy?url=<编码后的绝对URL>&lang=<目标语言>`。

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
pub use url::Url;

/// 代理入口路由
pub const PROXY_PATH: &str = "/proxy";

/// Define the percent-encoding set for query values - encode everything except unreserved characters
const QUERY_VALUE_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ').add(b'"').add(b'<').add(b'>').add(b'`').add(b'%')
    .add(b':').add(b'/').add(b'?').add(b'#').add(b'[').add(b']').add(b'@')
    .add(b'!').add(b'$').add(b'&').add(b'\'').add(b'(').add(b')')
    .add(b'*').add(b'+').add(b',').add(b';').add(b'=').add(b'{').add(b'}')
    .add(b'|').add(b'\\').add(b'^');

/// 判断URL是否为 http 或 https
pub fn is_http_url(url: &Url) -> bool {
    url.scheme() == "http" || url.scheme() == "https"
}

/// 计算页面源站（scheme://host[:port]/）
pub fn page_origin(page_url: &Url) -> Url {
    let mut origin = page_url.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);
    // 凭据不属于源站
    let _ = origin.set_username("");
    let _ = origin.set_password(None);
    origin
}

/// 将属性值解析为绝对URL
///
/// 已是绝对URL的值原样解析；其余值（`/x` 与 `x` 一样）都拼接到源站根路径上，
/// 不按当前页面路径做完整的相对解析。
pub fn resolve_against_origin(origin: &Url, value: &str) -> Option<Url> {
    if let Ok(absolute) = Url::parse(value) {
        return Some(absolute);
    }

    // 协议相对链接 (//cdn.example.com/app.js) 由 join 处理
    if value.starts_with("//") {
        return origin.join(value).ok();
    }

    origin.join(value.trim_start_matches('/')).ok()
}

/// 构建代理链接
pub fn create_proxy_url(absolute_url: &Url, target_lang: &str) -> String {
    format!(
        "{}?url={}&lang={}",
        PROXY_PATH,
        utf8_percent_encode(absolute_url.as_str(), QUERY_VALUE_ENCODE_SET),
        utf8_percent_encode(target_lang, QUERY_VALUE_ENCODE_SET),
    )
}

/// 从代理链接中还原 (原始URL, 目标语言)
pub fn parse_proxy_url(value: &str) -> Option<(String, String)> {
    let query = value.strip_prefix(PROXY_PATH)?.strip_prefix('?')?;

    let mut original_url = None;
    let mut target_lang = None;
    for (key, val) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "url" => original_url = Some(val.into_owned()),
            "lang" => target_lang = Some(val.into_owned()),
            _ => {}
        }
    }

    Some((original_url?, target_lang?))
}
