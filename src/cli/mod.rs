//! CLI: 命令行参数解析
//!
//! 不带任何参数时使用配置文件（或默认配置）中的种子页，行为与一次性脚本相同。
//!
//! - 默认运行：`atlas-spider`
//! - 指定种子页：`atlas-spider https://www.woyaogexing.com/touxiang/index_3.html`
//! - 指定配置：`atlas-spider -c ./atlas-spider.toml`
//! - 调整 worker：`atlas-spider -w 4 --no-delay`

use clap::Parser;

use crate::config::Config;
use crate::core::error::CrawlError;
use crate::utils::validator;

pub const DEFAULT_CONFIG_PATH: &str = "./atlas-spider.toml";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "atlas-spider",
    author = "panzhifu",
    version = env!("CARGO_PKG_VERSION"),
    about = "从列表页发现图集并下载其中的图片",
    long_about = "抓取种子列表页中的全部图集，按图集标题建目录，以图片URL的md5命名保存图片。\n\n示例：\n  atlas-spider\n  atlas-spider https://www.woyaogexing.com/touxiang/index_3.html\n  atlas-spider -w 4 -o ./pictures --no-delay\n"
)]
pub struct Args {
    /// 种子列表页，覆盖配置文件中的 seed_url
    #[arg(required = false, help = "种子列表页 URL，覆盖配置文件中的设置。")]
    pub seed_url: Option<String>,

    /// 配置文件路径
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONFIG_PATH.to_string(), help = "配置文件路径，不存在时写入默认配置。")]
    pub config: String,

    /// 图片保存根目录
    #[arg(short = 'o', long, help = "图片保存根目录，覆盖配置文件中的设置。")]
    pub output_dir: Option<String>,

    /// worker 数量
    #[arg(short = 'w', long, help = "同时处理的图集数量，覆盖配置文件中的设置。")]
    pub workers: Option<usize>,

    /// 关闭每个图集前的随机等待
    #[arg(long, help = "关闭每个图集开始前的随机等待。")]
    pub no_delay: bool,
}

impl Args {
    pub fn parse_args() -> Result<(Self, Config), CrawlError> {
        Args::parse().into_config()
    }

    /// 加载配置文件并合并命令行参数
    pub fn into_config(self) -> Result<(Self, Config), CrawlError> {
        if let Some(seed_url) = &self.seed_url {
            if !validator::is_valid_url(seed_url) {
                return Err(CrawlError::invalid_url(seed_url.clone()));
            }
        }

        let mut config = Config::load(&self.config)
            .map_err(|e| CrawlError::config_error(format!("无法读取配置文件 {}: {}", self.config, e)))?;
        config.merge_from_args(&self);
        config.validate()?;

        Ok((self, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_args_parsing_defaults() {
        let args = Args::try_parse_from(["atlas-spider"]).unwrap();
        assert!(args.seed_url.is_none());
        assert_eq!(args.config, DEFAULT_CONFIG_PATH);
        assert!(!args.no_delay);
    }

    #[test]
    fn test_into_config_merges_args() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("spider.toml");
        let args = Args::try_parse_from([
            "atlas-spider",
            "-c",
            config_path.to_str().unwrap(),
            "-w",
            "3",
            "https://www.woyaogexing.com/touxiang/index_3.html",
        ])
        .unwrap();

        let (_, config) = args.into_config().unwrap();
        assert_eq!(config.worker_count, 3);
        assert_eq!(config.seed_url, "https://www.woyaogexing.com/touxiang/index_3.html");
        assert!(config_path.exists());
    }

    #[test]
    fn test_into_config_rejects_bad_seed() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("spider.toml");
        let args = Args::try_parse_from(["atlas-spider", "-c", config_path.to_str().unwrap(), "not-a-url"]).unwrap();
        assert!(matches!(args.into_config(), Err(CrawlError::InvalidUrl(_))));
    }

    #[test]
    fn test_into_config_rejects_zero_workers() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("spider.toml");
        let args = Args::try_parse_from(["atlas-spider", "-c", config_path.to_str().unwrap(), "-w", "0"]).unwrap();
        assert!(matches!(args.into_config(), Err(CrawlError::ConfigError(_))));
    }
}
