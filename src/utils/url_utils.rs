// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{ParseError, Url};

/// 跟踪类查询参数（精确匹配）
const TRACKING_PARAMS: &[&str] = &[
    "fbclid", "gclid", "dclid", "msclkid", "yclid", "igshid", "mc_cid", "mc_eid", "_ga", "_hsenc",
    "_hsmi", "ref", "ref_src", "spm", "from", "share_token",
];

/// 将可能为相对路径的URL转换为绝对路径URL
pub fn resolve_url(base_url: &Url, path: &str) -> Result<Url, ParseError> {
    base_url.join(path)
}

/// 检查字符串是否为可抓取的 http(s) 绝对URL
pub fn is_http_url(value: &str) -> bool {
    Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

/// 归一化文章链接
///
/// 解析为绝对URL、丢弃片段、去除跟踪参数并去掉末尾斜杠。
/// 非 http(s) 链接（`javascript:`、`mailto:` 等）与空链接返回 `None`。
pub fn normalize_link(base_url: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let mut url = resolve_url(base_url, href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    let mut normalized = url.to_string();
    if url.query().is_none() && normalized.ends_with('/') {
        normalized.pop();
    }
    Some(normalized)
}

fn is_tracking_param(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://news.example.com/section/list").unwrap()
    }

    #[test]
    fn test_resolve_root_relative_url() {
        let base = Url::parse("http://example.com/a/b").unwrap();
        assert_eq!(
            resolve_url(&base, "/c").unwrap().as_str(),
            "http://example.com/c"
        );
    }

    #[test]
    fn test_normalize_relative_link() {
        assert_eq!(
            normalize_link(&base(), "../story/42/").as_deref(),
            Some("https://news.example.com/story/42")
        );
    }

    #[test]
    fn test_normalize_strips_tracking_params_and_fragment() {
        assert_eq!(
            normalize_link(
                &base(),
                "/story/7?utm_source=x&id=3&fbclid=abc&UTM_Medium=y#comments"
            )
            .as_deref(),
            Some("https://news.example.com/story/7?id=3")
        );
    }

    #[test]
    fn test_normalize_root_has_no_trailing_slash() {
        assert_eq!(
            normalize_link(&base(), "https://Example.com/").as_deref(),
            Some("https://example.com")
        );
    }

    #[test]
    fn test_equivalent_links_collapse() {
        let a = normalize_link(&base(), "/story/1");
        let b = normalize_link(&base(), "https://news.example.com/story/1/?utm_campaign=z");
        assert_eq!(a, b);
    }

    #[test]
    fn test_non_http_links_are_rejected() {
        assert_eq!(normalize_link(&base(), "javascript:void(0)"), None);
        assert_eq!(normalize_link(&base(), "mailto:desk@example.com"), None);
        assert_eq!(normalize_link(&base(), "#top"), None);
        assert_eq!(normalize_link(&base(), "   "), None);
    }

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("https://example.com/news"));
        assert!(!is_http_url("ftp://example.com"));
        assert!(!is_http_url("not a url"));
    }
}
