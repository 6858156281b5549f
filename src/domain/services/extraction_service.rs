// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use futures::stream::{self, StreamExt};
use scraper::Html;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::models::article::NewArticle;
use crate::domain::models::crawl_error::CrawlErrorKind;
use crate::domain::models::crawl_outcome::{CandidateFailure, CrawlOutcome, CrawlProgress};
use crate::domain::models::schedule::CrawlParams;
use crate::domain::models::source::{Source, SourceSelectors};
use crate::domain::repositories::article_repository::{DedupOutcome, DedupStore};
use crate::domain::repositories::RepositoryError;
use crate::domain::services::selector_resolver::{
    element_text, list_elements, resolve, resolve_href_in, resolve_hrefs, resolve_in,
};
use crate::engines::factory::DriverFactory;
use crate::engines::traits::{CrawlDriver, FetchError, FetchRequest, FetchedPage};
use crate::utils::url_utils::normalize_link;

/// 流水线错误
///
/// 只有使整个作业失败的情况才会以错误返回；候选级问题记录在 `CrawlOutcome` 中
#[derive(Error, Debug)]
pub enum PipelineError {
    /// 列表页抓取失败
    #[error("Failed to fetch list page: {0}")]
    ListPage(FetchError),
    /// 作业超过硬超时
    #[error("Crawl exceeded its {0}ms deadline")]
    Timeout(u64),
    /// 写入文章失败
    #[error("Storage error: {0}")]
    Storage(#[from] RepositoryError),
    /// 来源配置不可用
    #[error("Invalid source configuration: {0}")]
    InvalidSource(String),
}

impl PipelineError {
    /// 映射到抓取错误分类
    pub fn crawl_error_kind(&self) -> CrawlErrorKind {
        match self {
            PipelineError::ListPage(e) => e.crawl_error_kind(),
            PipelineError::Timeout(_) => CrawlErrorKind::NavigationTimeout,
            PipelineError::Storage(_) => CrawlErrorKind::NetworkError,
            PipelineError::InvalidSource(_) => CrawlErrorKind::ValidationError,
        }
    }
}

/// 待处理的候选文章
#[derive(Debug, Clone)]
struct Candidate {
    link: String,
    depth: u32,
    title: Option<String>,
    lead: Option<String>,
    content: Option<String>,
}

/// 详情页解析结果
struct DetailExtraction {
    title: Option<String>,
    lead: Option<String>,
    content: Option<String>,
    follow_ups: Vec<String>,
}

/// 抓取流水线
///
/// 抓取列表页 → 逐个候选解析标题/导语/正文 → 去重写入 → 按需跟进详情页直到深度上限
pub struct ExtractionPipeline {
    drivers: Arc<DriverFactory>,
    dedup: Arc<dyn DedupStore>,
    fetch_concurrency: usize,
}

impl ExtractionPipeline {
    /// 创建流水线
    ///
    /// # 参数
    ///
    /// * `drivers` - 驱动工厂
    /// * `dedup` - 去重存储
    /// * `fetch_concurrency` - 单个作业内详情页抓取的并发上限
    pub fn new(
        drivers: Arc<DriverFactory>,
        dedup: Arc<dyn DedupStore>,
        fetch_concurrency: usize,
    ) -> Self {
        Self {
            drivers,
            dedup,
            fetch_concurrency: fetch_concurrency.max(1),
        }
    }

    pub fn drivers(&self) -> &Arc<DriverFactory> {
        &self.drivers
    }

    /// 对一个来源执行一次抓取
    ///
    /// # 参数
    ///
    /// * `source` - 来源配置快照
    /// * `params` - 抓取参数
    ///
    /// # 返回值
    ///
    /// * `Ok(CrawlOutcome)` - 聚合计数与候选级失败
    /// * `Err(PipelineError)` - 列表页抓取失败或存储不可用
    pub async fn run(
        &self,
        source: &Source,
        params: &CrawlParams,
    ) -> Result<CrawlOutcome, PipelineError> {
        let progress = CrawlProgress::new();
        self.run_with_progress(source, params, &progress).await?;
        Ok(progress.snapshot())
    }

    /// 执行抓取并把计数逐步写入 `progress`
    ///
    /// 调用方负责施加作业级硬超时；取消该future会一并取消所有进行中的详情页抓取，
    /// 已写入的文章计数保留在 `progress` 中
    pub async fn run_with_progress(
        &self,
        source: &Source,
        params: &CrawlParams,
        progress: &CrawlProgress,
    ) -> Result<(), PipelineError> {
        let base_url = Url::parse(&source.base_url)
            .map_err(|e| PipelineError::InvalidSource(format!("{}: {}", source.base_url, e)))?;
        let driver = self
            .drivers
            .driver_for(source.driver)
            .map_err(PipelineError::ListPage)?;
        let timeout = Duration::from_millis(params.timeout_ms);

        let list_page = driver
            .fetch(&FetchRequest::new(base_url.as_str(), timeout))
            .await
            .map_err(PipelineError::ListPage)?;
        let page_url = Url::parse(&list_page.final_url).unwrap_or(base_url);

        let mut candidates = match extract_candidates(&list_page.html, &page_url, &source.selectors)
        {
            Some(candidates) => candidates,
            None => {
                progress.record_failure(CandidateFailure {
                    link: page_url.to_string(),
                    depth: 0,
                    kind: CrawlErrorKind::SelectorNotFound,
                    message: "no list selector matched the page".to_string(),
                });
                return Ok(());
            }
        };

        let found = candidates.len() as u32;
        progress.update(|outcome| outcome.found = found);
        candidates.truncate(params.article_limit as usize);
        info!(
            source = %source.name,
            found,
            kept = candidates.len(),
            "Extracted list candidates"
        );

        if params.follows_detail_pages() {
            self.follow_detail_pages(driver, source, params, candidates, progress)
                .await?;
        } else {
            for candidate in candidates {
                progress.update(|outcome| outcome.processed += 1);
                let Some(title) = candidate.title else {
                    progress.record_failure(CandidateFailure {
                        link: candidate.link,
                        depth: 0,
                        kind: CrawlErrorKind::SelectorNotFound,
                        message: "no title selector matched the list item".to_string(),
                    });
                    continue;
                };
                let article = NewArticle::new(
                    source.id,
                    candidate.link,
                    title,
                    candidate.lead,
                    candidate.content,
                    0,
                );
                self.store(article, progress).await?;
            }
        }

        Ok(())
    }

    /// 逐层抓取详情页，每层内按文档顺序有界并发
    async fn follow_detail_pages(
        &self,
        driver: Arc<dyn CrawlDriver>,
        source: &Source,
        params: &CrawlParams,
        candidates: Vec<Candidate>,
        progress: &CrawlProgress,
    ) -> Result<(), PipelineError> {
        let timeout = Duration::from_millis(params.timeout_ms);
        let limit = params.article_limit as usize;
        let mut seen: HashSet<String> = candidates.iter().map(|c| c.link.clone()).collect();
        let mut scheduled = candidates.len();
        let mut level: Vec<Candidate> = candidates
            .into_iter()
            .map(|c| Candidate { depth: 1, ..c })
            .collect();

        while !level.is_empty() {
            let fetched: Vec<(Candidate, Result<FetchedPage, FetchError>)> = stream::iter(level)
                .map(|candidate| {
                    let driver = driver.clone();
                    async move {
                        let request = FetchRequest::new(candidate.link.as_str(), timeout);
                        let page = driver.fetch(&request).await;
                        (candidate, page)
                    }
                })
                .buffered(self.fetch_concurrency)
                .collect()
                .await;

            let mut next_level = Vec::new();
            for (candidate, page) in fetched {
                progress.update(|outcome| outcome.processed += 1);
                let page = match page {
                    Ok(page) => page,
                    Err(e) => {
                        warn!(link = %candidate.link, error = %e, "Detail page fetch failed");
                        progress.record_failure(CandidateFailure {
                            link: candidate.link,
                            depth: candidate.depth,
                            kind: e.crawl_error_kind(),
                            message: e.to_string(),
                        });
                        continue;
                    }
                };

                let follow = candidate.depth < params.max_depth;
                let detail = extract_detail(&page, &source.selectors, follow);

                for link in detail.follow_ups {
                    if scheduled >= limit {
                        break;
                    }
                    if seen.insert(link.clone()) {
                        scheduled += 1;
                        next_level.push(Candidate {
                            link,
                            depth: candidate.depth + 1,
                            title: None,
                            lead: None,
                            content: None,
                        });
                    }
                }

                if detail.title.is_none() && detail.content.is_none() {
                    progress.record_failure(CandidateFailure {
                        link: candidate.link,
                        depth: candidate.depth,
                        kind: CrawlErrorKind::SelectorNotFound,
                        message: "no title or content selector matched the detail page"
                            .to_string(),
                    });
                    continue;
                }

                let Some(title) = detail.title.or(candidate.title) else {
                    progress.record_failure(CandidateFailure {
                        link: candidate.link,
                        depth: candidate.depth,
                        kind: CrawlErrorKind::SelectorNotFound,
                        message: "no title selector matched".to_string(),
                    });
                    continue;
                };

                let article = NewArticle::new(
                    source.id,
                    candidate.link,
                    title,
                    detail.lead.or(candidate.lead),
                    detail.content.or(candidate.content),
                    candidate.depth,
                );
                self.store(article, progress).await?;
            }

            level = next_level;
        }

        Ok(())
    }

    async fn store(
        &self,
        article: NewArticle,
        progress: &CrawlProgress,
    ) -> Result<(), PipelineError> {
        match self.dedup.check_and_insert(article).await? {
            DedupOutcome::Inserted(article) => {
                debug!(link = %article.link, depth = article.depth, "Stored new article");
                progress.update(|outcome| outcome.new_articles += 1);
                metrics::counter!("crawl_articles_new_total").increment(1);
            }
            DedupOutcome::Duplicate => {
                progress.update(|outcome| outcome.duplicates += 1);
                metrics::counter!("crawl_articles_duplicate_total").increment(1);
            }
        }
        Ok(())
    }
}

/// 从列表页提取候选
///
/// 每个列表元素是一个作用域：链接来自链接选择器（回退到元素自身或其后代的 `href`），
/// 标题、导语、正文在元素内解析。候选按归一化链接在文档顺序上去重。
/// 没有任何列表选择器命中时返回 `None`。
fn extract_candidates(html: &str, page_url: &Url, selectors: &SourceSelectors) -> Option<Vec<Candidate>> {
    let document = Html::parse_document(html);
    let (_, items) = list_elements(&document, &selectors.list)?;
    let anchor = vec!["a[href]".to_string()];

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for item in items {
        let href = resolve_href_in(item, &selectors.link)
            .or_else(|| item.value().attr("href").map(str::to_string))
            .or_else(|| resolve_href_in(item, &anchor));
        let Some(link) = href.and_then(|href| normalize_link(page_url, &href)) else {
            debug!("Skipping list item without a usable link");
            continue;
        };
        if !seen.insert(link.clone()) {
            continue;
        }

        let title = resolve_in(item, &selectors.title)
            .map(|m| m.text)
            .or_else(|| Some(element_text(item)).filter(|t| !t.is_empty()));
        candidates.push(Candidate {
            link,
            depth: 0,
            title,
            lead: resolve_in(item, &selectors.lead).map(|m| m.text),
            content: resolve_in(item, &selectors.content).map(|m| m.text),
        });
    }
    Some(candidates)
}

/// 解析详情页
fn extract_detail(page: &FetchedPage, selectors: &SourceSelectors, follow: bool) -> DetailExtraction {
    let document = Html::parse_document(&page.html);
    let follow_ups = match (follow, Url::parse(&page.final_url)) {
        (true, Ok(page_url)) => resolve_hrefs(&document, &selectors.router)
            .into_iter()
            .filter_map(|href| normalize_link(&page_url, &href))
            .collect(),
        _ => Vec::new(),
    };
    DetailExtraction {
        title: resolve(&document, &selectors.title).map(|m| m.text),
        lead: resolve(&document, &selectors.lead).map(|m| m.text),
        content: resolve(&document, &selectors.content).map(|m| m.text),
        follow_ups,
    }
}

#[cfg(test)]
#[path = "extraction_service_test.rs"]
mod tests;
