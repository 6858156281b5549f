// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 新闻来源实体
///
/// 描述一个被抓取的新闻站点：入口URL、各字段的选择器回退链以及渲染驱动。
/// 作业开始执行时会持有来源的一份快照，执行期间的编辑不会影响正在进行的抓取。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// 来源唯一标识符
    pub id: Uuid,
    /// 来源名称
    pub name: String,
    /// 列表页URL
    pub base_url: String,
    /// 各字段的选择器列表
    pub selectors: SourceSelectors,
    /// 渲染驱动
    pub driver: DriverKind,
    /// 是否启用
    pub active: bool,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
}

impl Source {
    /// 创建新的来源
    ///
    /// # 参数
    ///
    /// * `name` - 来源名称
    /// * `base_url` - 列表页URL
    /// * `selectors` - 选择器配置
    /// * `driver` - 渲染驱动
    pub fn new(name: String, base_url: String, selectors: SourceSelectors, driver: DriverKind) -> Self {
        let now: DateTime<FixedOffset> = Utc::now().into();
        Self {
            id: Uuid::new_v4(),
            name,
            base_url,
            selectors,
            driver,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 字段选择器集合
///
/// 每个字段都是一条有序的回退链，按顺序尝试，第一个产生非空文本的选择器胜出
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSelectors {
    /// 列表项选择器
    #[serde(default)]
    pub list: Vec<String>,
    /// 标题选择器
    #[serde(default)]
    pub title: Vec<String>,
    /// 导语选择器
    #[serde(default)]
    pub lead: Vec<String>,
    /// 正文选择器
    #[serde(default)]
    pub content: Vec<String>,
    /// 链接选择器
    #[serde(default)]
    pub link: Vec<String>,
    /// 详情页上继续跟进的链接选择器
    #[serde(default)]
    pub router: Vec<String>,
}

impl SourceSelectors {
    /// 获取指定字段的选择器列表
    pub fn field(&self, field: SelectorField) -> &[String] {
        match field {
            SelectorField::List => &self.list,
            SelectorField::Title => &self.title,
            SelectorField::Lead => &self.lead,
            SelectorField::Content => &self.content,
            SelectorField::Link => &self.link,
            SelectorField::Router => &self.router,
        }
    }

    /// 遍历所有字段及其选择器
    pub fn iter(&self) -> impl Iterator<Item = (SelectorField, &[String])> {
        SelectorField::ALL
            .iter()
            .map(move |field| (*field, self.field(*field)))
    }
}

/// 选择器字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorField {
    List,
    Title,
    Lead,
    Content,
    Link,
    Router,
}

impl SelectorField {
    pub const ALL: [SelectorField; 6] = [
        SelectorField::List,
        SelectorField::Title,
        SelectorField::Lead,
        SelectorField::Content,
        SelectorField::Link,
        SelectorField::Router,
    ];
}

impl fmt::Display for SelectorField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            SelectorField::List => "list",
            SelectorField::Title => "title",
            SelectorField::Lead => "lead",
            SelectorField::Content => "content",
            SelectorField::Link => "link",
            SelectorField::Router => "router",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for SelectorField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list" => Ok(SelectorField::List),
            "title" => Ok(SelectorField::Title),
            "lead" => Ok(SelectorField::Lead),
            "content" => Ok(SelectorField::Content),
            "link" => Ok(SelectorField::Link),
            "router" => Ok(SelectorField::Router),
            other => Err(format!("unknown selector type '{}'", other)),
        }
    }
}

/// 渲染驱动类型
///
/// `puppeteer` 为无头浏览器A，`playwright` 与 `selenium` 共用无头浏览器B，
/// `cheerio` 为不执行脚本的静态解析器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    Puppeteer,
    Playwright,
    Selenium,
    #[default]
    Cheerio,
}

impl DriverKind {
    pub const ALL: [DriverKind; 4] = [
        DriverKind::Puppeteer,
        DriverKind::Playwright,
        DriverKind::Selenium,
        DriverKind::Cheerio,
    ];

    /// 是否需要无头浏览器
    pub fn is_headless(&self) -> bool {
        !matches!(self, DriverKind::Cheerio)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DriverKind::Puppeteer => "puppeteer",
            DriverKind::Playwright => "playwright",
            DriverKind::Selenium => "selenium",
            DriverKind::Cheerio => "cheerio",
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DriverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "puppeteer" => Ok(DriverKind::Puppeteer),
            "playwright" => Ok(DriverKind::Playwright),
            "selenium" => Ok(DriverKind::Selenium),
            "cheerio" => Ok(DriverKind::Cheerio),
            other => Err(format!(
                "unknown driver '{}', expected one of puppeteer, playwright, selenium, cheerio",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_kind_round_trips_through_strings() {
        for kind in DriverKind::ALL {
            assert_eq!(kind.to_string().parse::<DriverKind>().unwrap(), kind);
        }
        assert_eq!("  Cheerio ".parse::<DriverKind>().unwrap(), DriverKind::Cheerio);
        assert!("phantomjs".parse::<DriverKind>().is_err());
    }

    #[test]
    fn test_selectors_deserialize_with_missing_fields() {
        let selectors: SourceSelectors =
            serde_json::from_str(r#"{"list": [".pb-3 a"], "title": [".prosed"]}"#).unwrap();
        assert_eq!(selectors.field(SelectorField::List), [".pb-3 a".to_string()]);
        assert!(selectors.router.is_empty());
        assert_eq!(selectors.iter().count(), 6);
    }
}
