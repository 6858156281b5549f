// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::selector_test::{
    SampleElement, SelectorTestData, SelectorTestMetadata, SelectorTestPerformance,
    SelectorTestRequestDto, SelectorTestResponseDto,
};
use crate::application::use_cases::UseCaseError;
use crate::domain::models::source::{DriverKind, SelectorField};
use crate::domain::services::selector_resolver::{resolve_list, validate_selectors, ListMatch};
use crate::engines::factory::DriverFactory;
use crate::engines::traits::FetchRequest;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;
use validator::Validate;

/// 返回的样例元素数量上限
const MAX_SAMPLES: usize = 10;
/// 列表选择器匹配数超过该值时提示收窄
const BROAD_LIST_THRESHOLD: usize = 100;

/// 构建工具生成的类名（CSS Modules、styled-components、emotion等），页面重新发布后通常会变化
static GENERATED_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.(?:css|sc|jsx|svelte|emotion)-[\w-]+|\.\w+__\w{5,}")
        .expect("Invalid generated class regex")
});

/// 选择器测试用例
///
/// 对任意URL执行一次驱动抓取和选择器解析，不写入任何数据，也不经过作业队列
pub struct SelectorTestUseCase {
    drivers: Arc<DriverFactory>,
    navigation_timeout: Duration,
}

impl SelectorTestUseCase {
    pub fn new(drivers: Arc<DriverFactory>, navigation_timeout: Duration) -> Self {
        Self {
            drivers,
            navigation_timeout,
        }
    }

    /// 测试选择器
    ///
    /// # 参数
    ///
    /// * `dto` - 测试请求，`selector` 可以是单个选择器或回退链
    ///
    /// # 返回值
    ///
    /// 返回匹配数量、样例元素、页面元数据、耗时与改进建议
    pub async fn test_selector(
        &self,
        dto: SelectorTestRequestDto,
    ) -> Result<SelectorTestResponseDto, UseCaseError> {
        dto.validate()?;
        let selectors: Vec<String> = dto
            .selector
            .into_vec()
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if selectors.is_empty() {
            return Err(UseCaseError::Validation(
                "selector must not be empty".to_string(),
            ));
        }
        let field = match dto.selector_type.as_deref() {
            Some(raw) => raw.parse::<SelectorField>().map_err(UseCaseError::Validation)?,
            None => SelectorField::List,
        };
        let kind = match dto.driver_type.as_deref() {
            Some(raw) => raw.parse::<DriverKind>().map_err(UseCaseError::Validation)?,
            None => DriverKind::Cheerio,
        };

        let total = Instant::now();
        let driver = self.drivers.driver_for(kind)?;
        let page = driver
            .fetch(&FetchRequest::new(dto.url.clone(), self.navigation_timeout))
            .await?;

        let resolve_started = Instant::now();
        let matched = inspect(&page.html, &selectors);
        let resolve_time_ms = resolve_started.elapsed().as_millis() as u64;

        let suggestions = suggest(&selectors, field, kind, matched.as_ref());
        let (count, samples, matched_selector) = match matched {
            Some(m) => (
                m.elements.len(),
                m.elements
                    .into_iter()
                    .take(MAX_SAMPLES)
                    .map(SampleElement::from)
                    .collect(),
                Some(m.selector),
            ),
            None => (0, Vec::new(), None),
        };
        debug!(url = %dto.url, count, "Selector test finished");

        Ok(SelectorTestResponseDto {
            success: count > 0,
            data: SelectorTestData { count, samples },
            metadata: SelectorTestMetadata {
                url: dto.url,
                final_url: page.final_url,
                http_status: page.http_status,
                driver: kind.to_string(),
                selector_type: field.to_string(),
                matched_selector,
            },
            performance: SelectorTestPerformance {
                load_time_ms: page.load_time_ms,
                resolve_time_ms,
                total_time_ms: total.elapsed().as_millis() as u64,
            },
            suggestions,
        })
    }
}

fn inspect(html: &str, selectors: &[String]) -> Option<ListMatch> {
    let document = Html::parse_document(html);
    resolve_list(&document, selectors)
}

/// 根据匹配结果生成改进建议
fn suggest(
    selectors: &[String],
    field: SelectorField,
    kind: DriverKind,
    matched: Option<&ListMatch>,
) -> Vec<String> {
    let mut suggestions = Vec::new();

    for selector in selectors {
        if let Err(e) = validate_selectors(std::slice::from_ref(selector)) {
            suggestions.push(format!("Fix the selector syntax: {}", e));
        }
        if GENERATED_CLASS.is_match(selector) {
            suggestions.push(format!(
                "'{}' looks like an auto-generated class name that may change on redeploy; prefer a stable attribute or structural selector",
                selector
            ));
        }
    }

    let Some(matched) = matched else {
        let hint = if kind.is_headless() {
            "No elements matched; check the selector against the rendered page"
        } else {
            "No elements matched; the content may be rendered by JavaScript, try a headless driver"
        };
        suggestions.push(hint.to_string());
        return suggestions;
    };

    let count = matched.elements.len();
    match field {
        SelectorField::List if count > BROAD_LIST_THRESHOLD => suggestions.push(format!(
            "Selector matched {} elements; consider a more specific selector",
            count
        )),
        SelectorField::Title | SelectorField::Lead | SelectorField::Content if count > 1 => {
            suggestions.push(format!(
                "Selector matched {} elements but only the first is used; consider a more specific selector",
                count
            ))
        }
        _ => {}
    }

    let needs_href = matches!(
        field,
        SelectorField::List | SelectorField::Link | SelectorField::Router
    );
    if needs_href && matched.elements.iter().all(|e| e.href.is_none()) {
        suggestions.push(
            "Matched elements have no href attribute; target the <a> element to extract links"
                .to_string(),
        );
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selectors(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_match_suggests_headless_driver_for_static_pages() {
        let html = "<html><body><p>empty</p></body></html>";
        let list = selectors(&[".headline"]);
        let matched = inspect(html, &list);
        assert!(matched.is_none());

        let suggestions = suggest(&list, SelectorField::List, DriverKind::Cheerio, None);
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].contains("headless driver"));
    }

    #[test]
    fn test_missing_href_and_generated_class() {
        let html = r#"<ul><li class="css-1x2y3z">One</li><li class="css-1x2y3z">Two</li></ul>"#;
        let list = selectors(&[".css-1x2y3z"]);
        let matched = inspect(html, &list);
        assert_eq!(matched.as_ref().map(|m| m.elements.len()), Some(2));

        let suggestions = suggest(
            &list,
            SelectorField::List,
            DriverKind::Cheerio,
            matched.as_ref(),
        );
        assert!(suggestions.iter().any(|s| s.contains("auto-generated")));
        assert!(suggestions.iter().any(|s| s.contains("no href")));
    }

    #[test]
    fn test_generated_class_pattern() {
        assert!(GENERATED_CLASS.is_match("div.css-1x2y3z > a"));
        assert!(GENERATED_CLASS.is_match(".Card__title_3kF9a"));
        assert!(GENERATED_CLASS.is_match(".sc-bdVaJa"));
        assert!(!GENERATED_CLASS.is_match(".news-list a"));
        assert!(!GENERATED_CLASS.is_match("article h1"));
    }

    #[test]
    fn test_invalid_syntax_is_reported() {
        let list = selectors(&["div[", "h1"]);
        let matched = inspect("<h1>Title</h1>", &list);
        let suggestions = suggest(
            &list,
            SelectorField::Title,
            DriverKind::Cheerio,
            matched.as_ref(),
        );
        assert_eq!(matched.map(|m| m.selector), Some("h1".to_string()));
        assert!(suggestions.iter().any(|s| s.contains("syntax")));
    }
}
