use actix::prelude::*;
use anyhow::Context;
use std::time::{Duration, Instant};

use atlas_spider::cli;
use atlas_spider::core::{GetStats, HttpClient, ListFailed, Spider};
use atlas_spider::ui::{self, CrawlSummary, ProgressManager};
use atlas_spider::utils::logger::{FlushLog, LoggerActor, LoggerExt};

const PROGRESS_UPDATE_INTERVAL: Duration = Duration::from_millis(200);

#[actix::main]
async fn main() -> anyhow::Result<()> {
    let start_time = Instant::now();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (_args, config) = match cli::Args::parse_args() {
        Ok(parsed) => parsed,
        Err(e) => {
            ui::print_error(&format!("参数解析失败: {}", e));
            std::process::exit(1);
        }
    };

    let logger = LoggerActor::from_config(&config)
        .with_context(|| format!("无法打开日志文件 {}", config.log_file))?
        .start();
    logger.info("程序启动");
    logger.info(&config.get_summary());
    println!("{}", config.get_summary());

    let client = HttpClient::new(&config);
    let spider = Spider::new(config.clone(), client)?;
    let manager = spider.manager();
    let progress = ProgressManager::new(0);

    // 爬取与进度刷新在同一个任务里交替进行
    let crawl = spider.start();
    tokio::pin!(crawl);
    let mut ticker = tokio::time::interval(PROGRESS_UPDATE_INTERVAL);
    let result = loop {
        tokio::select! {
            result = &mut crawl => break result,
            _ = ticker.tick() => {
                if let Ok(stats) = manager.send(GetStats).await {
                    progress.update(&stats);
                }
            }
        }
    };
    progress.finish();

    let stats = match result {
        Ok(stats) => stats,
        Err(e) => {
            logger.error(&format!("爬取中止: {}", e));
            let _ = logger.send(FlushLog).await;
            ui::print_error(&format!("爬取中止: {}", e));
            println!("耗时 => {:.3}秒", start_time.elapsed().as_secs_f64());
            std::process::exit(1);
        }
    };
    progress.update(&stats);

    let failed = manager.send(ListFailed).await.unwrap_or_default();
    for meta in &failed {
        logger.warn(&format!("图集失败: {} - {:?}", meta.url, meta.status));
    }
    logger.info(&format!(
        "爬取完成 - 图集 {}/{}，图片 {} 张",
        stats.completed, stats.total, stats.images_saved
    ));
    let _ = logger.send(FlushLog).await;

    if stats.failed == 0 && stats.images_failed == 0 {
        ui::print_success(&format!("全部 {} 个图集处理完成", stats.total));
    }
    let summary = CrawlSummary {
        stats,
        failed,
        output_dir: config.output_dir.clone(),
        elapsed_time: start_time.elapsed(),
    };
    println!("{}", summary);

    Ok(())
}
