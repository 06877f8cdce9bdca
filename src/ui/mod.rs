mod progress;

use std::fmt;
use std::time::Duration;

use crate::core::manager::{AtlasMeta, AtlasStatus, CrawlStats};
pub use progress::ProgressManager;

pub fn print_success(message: &str) {
    println!("✓ {}", message);
}

pub fn print_error(message: &str) {
    println!("✗ {}", message);
}

/// 结束时打印的爬取摘要
pub struct CrawlSummary {
    pub stats: CrawlStats,
    pub failed: Vec<AtlasMeta>,
    pub output_dir: String,
    pub elapsed_time: Duration,
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n爬取摘要:")?;
        writeln!(f, "图集总数: {}", self.stats.total)?;
        writeln!(f, "完成: {}", self.stats.completed)?;
        writeln!(f, "失败: {}", self.stats.failed)?;
        writeln!(f, "保存图片: {}", self.stats.images_saved)?;
        writeln!(f, "失败图片: {}", self.stats.images_failed)?;
        writeln!(f, "保存目录: {}", self.output_dir)?;
        for meta in &self.failed {
            if let AtlasStatus::Failed(reason) = &meta.status {
                writeln!(f, "  ✗ {} - {}", meta.url, reason)?;
            }
        }
        write!(f, "耗时 => {:.3}秒", self.elapsed_time.as_secs_f64())
    }
}
