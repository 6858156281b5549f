// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{fixture_site, list_url, params, setup};
use newscrawl::domain::repositories::article_repository::ArticleQuery;
use std::collections::HashSet;

#[tokio::test]
async fn test_static_source_end_to_end_is_idempotent() {
    let ctx = setup().await;
    let site = fixture_site().await;
    let source = ctx.create_source(&list_url(&site)).await;
    let params = params(10, 10_000);

    let first = ctx.pipeline.run(&source, &params).await.unwrap().summary();
    assert_eq!(first.processed, 10);
    assert_eq!(first.new_articles, 10);
    assert_eq!(first.duplicates, 0);
    assert_eq!(first.errors, 0);

    let second = ctx.pipeline.run(&source, &params).await.unwrap().summary();
    assert_eq!(second.processed, 10);
    assert_eq!(second.new_articles, 0);
    assert_eq!(second.duplicates, 10);
    assert_eq!(second.errors, 0);

    let stored = ctx
        .repositories
        .articles
        .list(ArticleQuery {
            source_id: Some(source.id),
            ..ArticleQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(stored.total, 10);

    let links: HashSet<_> = stored.items.iter().map(|a| a.link.clone()).collect();
    let hashes: HashSet<_> = stored.items.iter().map(|a| a.hash.clone()).collect();
    assert_eq!(links.len(), 10);
    assert_eq!(hashes.len(), 10);
    assert!(stored.items.iter().all(|a| a.depth == 0));
    assert!(links.iter().all(|link| !link.contains("utm_source")));
}

#[tokio::test]
async fn test_two_sources_sharing_articles_do_not_duplicate() {
    let ctx = setup().await;
    let site = fixture_site().await;
    let first = ctx.create_source(&list_url(&site)).await;
    let second = ctx.create_source(&list_url(&site)).await;

    let a = ctx.pipeline.run(&first, &params(5, 10_000)).await.unwrap();
    let b = ctx.pipeline.run(&second, &params(10, 10_000)).await.unwrap();

    assert_eq!(a.new_articles, 5);
    assert_eq!(b.new_articles, 5);
    assert_eq!(b.duplicates, 5);
}
