use indicatif::{ProgressBar, ProgressStyle};

use crate::core::manager::CrawlStats;

/// 图集处理进度条
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}") {
            bar.set_style(style);
        }
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self { bar: ProgressBar::hidden() }
    }

    /// 用统计结果刷新进度
    pub fn update(&self, stats: &CrawlStats) {
        if stats.total as u64 > self.bar.length().unwrap_or(0) {
            self.bar.set_length(stats.total as u64);
        }
        self.bar.set_position(stats.finished() as u64);
        self.bar.set_message(format!(
            "图片 {} 张 | 失败图集 {}",
            stats.images_saved, stats.failed
        ));
    }

    pub fn finish(&self) {
        self.bar.finish();
    }
}
