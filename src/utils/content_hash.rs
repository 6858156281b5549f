// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sha2::{Digest, Sha256};

/// 生成文章内容哈希
///
/// 对标题与正文做归一化（小写、去标点、合并空白）后计算SHA-256，
/// 使只在排版上不同的同一篇文章得到相同的哈希
pub fn article_hash(title: &str, content: &str) -> String {
    let normalized = format!("{}\n{}", normalize_text(title), normalize_text(content));
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

/// 归一化文本
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// 折叠空白字符
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_ignores_formatting() {
        let a = article_hash("Breaking: Rust 2.0!", "Body  text\n here.");
        let b = article_hash("breaking rust 20", "body text here");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_hash_separates_title_and_content() {
        assert_ne!(article_hash("a b", "c"), article_hash("a", "b c"));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a\n\t b  "), "a b");
    }
}
