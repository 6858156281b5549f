// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use tracing::warn;

use crate::utils::content_hash::collapse_whitespace;

/// 选择器匹配结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedValue {
    /// 命中的选择器
    pub selector: String,
    /// 折叠空白后的文本
    pub text: String,
    /// 命中元素的 `href` 属性
    pub href: Option<String>,
}

/// 列表元素摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSummary {
    pub text: String,
    pub href: Option<String>,
    pub tag_name: String,
    pub class_name: String,
    pub id: String,
}

impl ElementSummary {
    fn from_element(element: ElementRef<'_>) -> Self {
        let value = element.value();
        Self {
            text: element_text(element),
            href: value.attr("href").map(str::to_string),
            tag_name: value.name().to_string(),
            class_name: value.attr("class").unwrap_or_default().to_string(),
            id: value.id().unwrap_or_default().to_string(),
        }
    }
}

/// 列表选择器匹配结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListMatch {
    pub selector: String,
    pub elements: Vec<ElementSummary>,
}

/// 解析选择器，无效的选择器记录警告后跳过
fn parse_selector(raw: &str) -> Option<Selector> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match Selector::parse(trimmed) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!("Skipping invalid selector '{}': {}", trimmed, e);
            None
        }
    }
}

/// 元素文本
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn first_non_empty<'a>(
    raw: &str,
    elements: impl Iterator<Item = ElementRef<'a>>,
) -> Option<MatchedValue> {
    for element in elements {
        let text = element_text(element);
        if !text.is_empty() {
            return Some(MatchedValue {
                selector: raw.trim().to_string(),
                text,
                href: element.value().attr("href").map(str::to_string),
            });
        }
    }
    None
}

/// 在整个文档中按顺序尝试选择器
///
/// 第一个产生非空文本的选择器胜出；全部未命中时返回 `None`，由调用方决定严重程度
///
/// # 参数
///
/// * `document` - 已解析的文档
/// * `selectors` - 有序的选择器回退链
pub fn resolve(document: &Html, selectors: &[String]) -> Option<MatchedValue> {
    selectors.iter().find_map(|raw| {
        let selector = parse_selector(raw)?;
        first_non_empty(raw, document.select(&selector))
    })
}

/// 在单个元素内按顺序尝试选择器
pub fn resolve_in(scope: ElementRef<'_>, selectors: &[String]) -> Option<MatchedValue> {
    selectors.iter().find_map(|raw| {
        let selector = parse_selector(raw)?;
        first_non_empty(raw, scope.select(&selector))
    })
}

/// 在元素内查找第一个带 `href` 的匹配
///
/// 链接元素经常没有文本（如图片链接），因此只要求 `href` 非空
pub fn resolve_href_in(scope: ElementRef<'_>, selectors: &[String]) -> Option<String> {
    selectors.iter().filter_map(|raw| parse_selector(raw)).find_map(|selector| {
        scope
            .select(&selector)
            .filter_map(|element| element.value().attr("href"))
            .map(str::trim)
            .find(|href| !href.is_empty())
            .map(str::to_string)
    })
}

/// 在文档中查找所有链接
pub fn resolve_hrefs(document: &Html, selectors: &[String]) -> Vec<String> {
    selectors
        .iter()
        .filter_map(|raw| parse_selector(raw))
        .flat_map(|selector| {
            document
                .select(&selector)
                .filter_map(|element| element.value().attr("href"))
                .map(|href| href.trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|href| !href.is_empty())
        .collect()
}

/// 列表选择器匹配
///
/// 第一个至少匹配到一个非空元素的选择器胜出，返回其全部元素摘要（保持文档顺序）
pub fn resolve_list(document: &Html, selectors: &[String]) -> Option<ListMatch> {
    list_elements(document, selectors).map(|(selector, elements)| ListMatch {
        selector,
        elements: elements.into_iter().map(ElementSummary::from_element).collect(),
    })
}

/// 列表选择器匹配，返回元素引用供调用方在各列表项内继续解析
pub fn list_elements<'a>(
    document: &'a Html,
    selectors: &[String],
) -> Option<(String, Vec<ElementRef<'a>>)> {
    for raw in selectors {
        let Some(selector) = parse_selector(raw) else {
            continue;
        };
        let elements: Vec<ElementRef<'a>> = document.select(&selector).collect();
        let has_content = elements
            .iter()
            .any(|e| !element_text(*e).is_empty() || e.value().attr("href").is_some());
        if has_content {
            return Some((raw.trim().to_string(), elements));
        }
    }
    None
}

/// 校验选择器语法
///
/// # 返回值
///
/// * `Ok(())` - 全部选择器可解析
/// * `Err(String)` - 第一个无法解析的选择器及原因
pub fn validate_selectors(selectors: &[String]) -> Result<(), String> {
    for raw in selectors {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("selector must not be empty".to_string());
        }
        Selector::parse(trimmed).map_err(|e| format!("invalid selector '{}': {}", trimmed, e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selectors(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fallback_order_uses_second_selector() {
        let document = Html::parse_document("<html><body><h1>Headline</h1></body></html>");
        let matched = resolve(&document, &selectors(&[".title", "h1"])).unwrap();
        assert_eq!(matched.selector, "h1");
        assert_eq!(matched.text, "Headline");
    }

    #[test]
    fn test_first_selector_wins_when_both_match() {
        let document =
            Html::parse_document(r#"<div class="title">Primary</div><h1>Secondary</h1>"#);
        let matched = resolve(&document, &selectors(&[".title", "h1"])).unwrap();
        assert_eq!(matched.text, "Primary");
    }

    #[test]
    fn test_empty_matches_are_skipped() {
        let document = Html::parse_document(r#"<h2 class="title">   </h2><h1>Real</h1>"#);
        let matched = resolve(&document, &selectors(&[".title", "h1"])).unwrap();
        assert_eq!(matched.selector, "h1");
    }

    #[test]
    fn test_not_found_and_invalid_selectors_do_not_raise() {
        let document = Html::parse_document("<p>text</p>");
        assert!(resolve(&document, &selectors(&["[[bad", ".missing"])).is_none());
        assert!(resolve(&document, &[]).is_none());
    }

    #[test]
    fn test_resolve_list_summarises_elements() {
        let document = Html::parse_document(
            r#"<ul>
                <li><a id="first" class="story big" href="/a">  Story   A </a></li>
                <li><a class="story" href="/b">Story B</a></li>
            </ul>"#,
        );
        let list = resolve_list(&document, &selectors(&[".nope", "li a"])).unwrap();

        assert_eq!(list.selector, "li a");
        assert_eq!(list.elements.len(), 2);
        assert_eq!(
            list.elements[0],
            ElementSummary {
                text: "Story A".to_string(),
                href: Some("/a".to_string()),
                tag_name: "a".to_string(),
                class_name: "story big".to_string(),
                id: "first".to_string(),
            }
        );
    }

    #[test]
    fn test_resolve_in_is_scoped_to_item() {
        let document = Html::parse_document(
            r#"<div class="item"><span class="t">One</span></div>
               <div class="item"><span class="x">Two</span></div>"#,
        );
        let (_, items) = list_elements(&document, &selectors(&[".item"])).unwrap();
        assert_eq!(resolve_in(items[0], &selectors(&[".t"])).unwrap().text, "One");
        assert!(resolve_in(items[1], &selectors(&[".t"])).is_none());
    }

    #[test]
    fn test_validate_selectors() {
        assert!(validate_selectors(&selectors(&[".a", "div > p"])).is_ok());
        assert!(validate_selectors(&selectors(&["div >"])).is_err());
        assert!(validate_selectors(&selectors(&["  "])).is_err());
    }
}
