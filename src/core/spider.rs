//! 爬取流程：发现图集 → 固定数量的 worker 从共享队列取任务
//! → 随机等待 → 抓取图集页 → 解析 → 逐张下载图片
//!
//! 单个图集或单张图片失败只记录在 `CrawlManagerActor` 中，不影响其他 worker。

use actix::prelude::*;
use futures::future::join_all;
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::config::Config;
use crate::core::error::{CrawlError, CrawlResult};
use crate::core::http::Fetcher;
use crate::core::manager::{
    CrawlManagerActor, CrawlStats, GetStats, ImageFailed, ImageSaved, MarkAtlasCompleted,
    MarkAtlasFailed, MarkAtlasRunning, RegisterAtlas,
};
use crate::core::parser::AtlasParser;
use crate::core::queue::{AtlasTask, TaskQueue};
use crate::core::storage::{image_file_stem, ImageStore};

pub struct Spider<F: Fetcher> {
    config: Config,
    fetcher: F,
    parser: AtlasParser,
    store: ImageStore,
    queue: TaskQueue,
    manager: Addr<CrawlManagerActor>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl<F: Fetcher> Spider<F> {
    /// 需要在 actix 运行时中调用（会启动 `CrawlManagerActor`）
    pub fn new(config: Config, fetcher: F) -> CrawlResult<Self> {
        let manager = CrawlManagerActor::new().start();
        Self::with_manager(config, fetcher, manager)
    }

    pub fn with_manager(config: Config, fetcher: F, manager: Addr<CrawlManagerActor>) -> CrawlResult<Self> {
        Ok(Self {
            store: ImageStore::new(&config.output_dir),
            parser: AtlasParser::new()?,
            config,
            fetcher,
            queue: TaskQueue::new(),
            manager,
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        })
    }

    pub fn manager(&self) -> Addr<CrawlManagerActor> {
        self.manager.clone()
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// 同时处理的图集数的历史峰值
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// 发现所有图集，再由 worker 池处理到队列清空
    pub async fn start(&self) -> CrawlResult<CrawlStats> {
        let discovered = self.discover(&self.config.seed_url).await?;
        log::info!("从 {} 发现 {} 个图集", self.config.seed_url, discovered);

        let workers = (0..self.config.worker_count.max(1)).map(|id| self.worker(id));
        join_all(workers).await;

        log::info!("队列已清空，共处理 {} 个图集", self.queue.completed());
        self.manager
            .send(GetStats)
            .await
            .map_err(|e| CrawlError::unknown(format!("查询统计失败: {}", e)))
    }

    /// 抓取列表页，把图集地址放入队列，返回发现的数量
    pub async fn discover(&self, url: &str) -> CrawlResult<usize> {
        let html = self.fetcher.fetch_text(url).await?;
        let links = self.parser.parse_atlas_links(&html, &self.config.site_origin);
        if links.is_empty() {
            log::warn!("列表页 {} 没有匹配到图集链接", url);
        }

        let count = links.len();
        for link in links {
            let task = AtlasTask::new(link);
            self.manager.do_send(RegisterAtlas { task_id: task.id, url: task.url.clone() });
            self.queue.push(task);
        }
        Ok(count)
    }

    async fn worker(&self, worker_id: usize) {
        while let Some(task) = self.queue.pop() {
            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(active, Ordering::SeqCst);
            self.manager.do_send(MarkAtlasRunning { task_id: task.id });

            match self.crawl(&task).await {
                Ok(saved) => {
                    log::info!("[worker {}] 图集完成: {} ({} 张)", worker_id, task.url, saved);
                    self.manager.do_send(MarkAtlasCompleted { task_id: task.id });
                }
                Err(error) => {
                    log::error!("[worker {}] 图集失败: {} - {}", worker_id, task.url, error);
                    self.manager.do_send(MarkAtlasFailed { task_id: task.id, error });
                }
            }

            self.active.fetch_sub(1, Ordering::SeqCst);
            self.queue.task_done();
        }
        log::debug!("[worker {}] 队列为空，退出", worker_id);
    }

    /// 处理单个图集，返回成功保存的图片数
    async fn crawl(&self, task: &AtlasTask) -> CrawlResult<usize> {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let html = self.fetcher.fetch_text(&task.url).await?;
        let gallery = self.parser.parse_gallery(&html)?;

        let mut saved = 0;
        for image_url in &gallery.image_urls {
            match self.download_image(image_url, &gallery.title).await {
                Ok(_) => {
                    saved += 1;
                    self.manager.do_send(ImageSaved { task_id: task.id });
                }
                Err(error) => {
                    if error.is_network() {
                        log::warn!("图片下载失败: {} - {}", image_url, error);
                    } else {
                        log::error!("图片保存失败: {} - {}", image_url, error);
                    }
                    self.manager.do_send(ImageFailed { task_id: task.id, error });
                }
            }
        }
        Ok(saved)
    }

    /// 下载一张图片并按 URL 的 md5 保存，返回 md5
    pub async fn download_image(&self, url: &str, title: &str) -> CrawlResult<String> {
        let bytes = self.fetcher.fetch_bytes(url).await?;
        let path = self.store.save(title, url, &bytes).await?;
        let key = image_file_stem(url);
        println!("{}", key);
        log::debug!("保存图片 {} -> {}", url, path.display());
        Ok(key)
    }

    fn next_delay(&self) -> Duration {
        let (min, max) = (self.config.delay_min_secs, self.config.delay_max_secs);
        if max <= 0.0 {
            return Duration::ZERO;
        }
        let secs = if min >= max { max } else { rand::thread_rng().gen_range(min..=max) };
        Duration::from_secs_f64(secs.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;

    struct NoopFetcher;

    #[async_trait(?Send)]
    impl Fetcher for NoopFetcher {
        async fn fetch_text(&self, url: &str) -> CrawlResult<String> {
            Err(CrawlError::network_error(format!("unreachable: {}", url)))
        }

        async fn fetch_bytes(&self, url: &str) -> CrawlResult<Bytes> {
            Err(CrawlError::network_error(format!("unreachable: {}", url)))
        }
    }

    #[actix_rt::test]
    async fn test_delay_stays_in_range() {
        let config = Config::default();
        let spider = Spider::new(config, NoopFetcher).unwrap();
        for _ in 0..100 {
            let delay = spider.next_delay();
            assert!(delay >= Duration::from_secs(2));
            assert!(delay <= Duration::from_secs(5));
        }
    }

    #[actix_rt::test]
    async fn test_zero_delay_skips_sleep() {
        let mut config = Config::default();
        config.delay_min_secs = 0.0;
        config.delay_max_secs = 0.0;
        let spider = Spider::new(config, NoopFetcher).unwrap();
        assert!(spider.next_delay().is_zero());
    }

    #[actix_rt::test]
    async fn test_discovery_failure_propagates() {
        let spider = Spider::new(Config::default(), NoopFetcher).unwrap();
        let result = spider.start().await;
        assert!(matches!(result, Err(CrawlError::NetworkError(_))));
        assert!(spider.queue().is_empty());
    }
}
