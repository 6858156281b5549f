// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::content_hash::article_hash;

/// 文章实体
///
/// `link` 与 `hash` 均唯一；重复的文章会被静默丢弃，而不是再写入一份
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub source_id: Uuid,
    pub title: String,
    /// 归一化后的链接
    pub link: String,
    pub lead: Option<String>,
    pub content: String,
    /// 内容哈希（SHA-256，十六进制）
    pub hash: String,
    /// 抓取深度，0 表示列表页结果
    pub depth: u32,
    /// 是否已读
    pub read: bool,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

/// 待写入的文章
#[derive(Debug, Clone, PartialEq)]
pub struct NewArticle {
    pub source_id: Uuid,
    pub title: String,
    pub link: String,
    pub lead: Option<String>,
    pub content: String,
    pub hash: String,
    pub depth: u32,
}

impl NewArticle {
    /// 根据提取结果构造待写入文章并计算内容哈希
    ///
    /// 正文缺失时依次回退到导语和标题
    pub fn new(
        source_id: Uuid,
        link: String,
        title: String,
        lead: Option<String>,
        content: Option<String>,
        depth: u32,
    ) -> Self {
        let content = content
            .filter(|c| !c.is_empty())
            .or_else(|| lead.clone())
            .unwrap_or_else(|| title.clone());
        let hash = article_hash(&title, &content);
        Self {
            source_id,
            title,
            link,
            lead,
            content,
            hash,
            depth,
        }
    }

    /// 转换为持久化实体
    pub fn into_article(self) -> Article {
        let now: DateTime<FixedOffset> = Utc::now().into();
        Article {
            id: Uuid::new_v4(),
            source_id: self.source_id,
            title: self.title,
            link: self.link,
            lead: self.lead,
            content: self.content,
            hash: self.hash,
            depth: self.depth,
            read: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_falls_back_to_lead_then_title() {
        let source = Uuid::new_v4();
        let with_lead = NewArticle::new(
            source,
            "https://a.test/1".into(),
            "Title".into(),
            Some("Lead".into()),
            None,
            0,
        );
        assert_eq!(with_lead.content, "Lead");

        let bare = NewArticle::new(source, "https://a.test/2".into(), "Title".into(), None, Some(String::new()), 0);
        assert_eq!(bare.content, "Title");
        assert_eq!(bare.hash, article_hash("Title", "Title"));
    }
}
