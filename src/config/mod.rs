use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use crate::core::error::{CrawlError, CrawlResult};
use crate::utils::validator;

/// 配置结构体
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// 种子列表页（发现图集的入口）
    pub seed_url: String,
    /// 站点域名前缀，拼接在图集相对路径之前
    pub site_origin: String,
    /// 每个请求携带的 Referer
    pub referer: String,
    /// 每个请求携带的 User-Agent
    pub user_agent: String,
    /// 图片保存根目录
    pub output_dir: String,
    /// 固定的 worker 数量（同时处理的图集数）
    pub worker_count: usize,
    /// 全局同时进行的 HTTP 请求上限
    pub max_concurrent_requests: usize,
    /// 每个图集开始前的随机等待下限（秒）
    pub delay_min_secs: f64,
    /// 每个图集开始前的随机等待上限（秒）
    pub delay_max_secs: f64,
    /// 网络超时时间（秒）
    pub timeout: u64,
    /// 单个响应体的最大字节数
    pub max_body_bytes: usize,
    /// 日志文件路径
    pub log_file: String,
    /// 日志文件轮转阈值（字节）
    pub log_max_size: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed_url: "https://www.woyaogexing.com/touxiang/index_2.html".to_string(),
            site_origin: "https://www.woyaogexing.com".to_string(),
            referer: "https://www.woyaogexing.com/".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36".to_string(),
            output_dir: "./atlas".to_string(),
            worker_count: 8,
            max_concurrent_requests: 5,
            delay_min_secs: 2.0,
            delay_max_secs: 5.0,
            timeout: 30,
            max_body_bytes: 32 * 1024 * 1024,
            log_file: "logs/atlas-spider.log".to_string(),
            log_max_size: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    /// 加载配置文件，不存在或格式错误时写入默认配置
    pub fn load(path: &str) -> CrawlResult<Self> {
        if Path::new(path).exists() {
            let content = fs::read_to_string(path)?;
            match toml::from_str(&content) {
                Ok(config) => Ok(config),
                Err(e) => {
                    log::warn!("配置文件格式错误: {}，将使用默认配置", e);
                    let config = Config::default();
                    config.save_with_tutorial(path)?;
                    Ok(config)
                }
            }
        } else {
            let config = Config::default();
            config.save_with_tutorial(path)?;
            Ok(config)
        }
    }

    /// 保存带说明的配置文件
    pub fn save_with_tutorial(&self, path: &str) -> CrawlResult<()> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let config_content = toml::to_string_pretty(self)
            .map_err(|e| CrawlError::unknown(format!("无法序列化配置: {}", e)))?;
        let full_content = format!("{}\n{}", Config::generate_tutorial_content(), config_content);
        fs::write(path, full_content)?;
        Ok(())
    }

    fn generate_tutorial_content() -> String {
        r#"# atlas-spider 配置文件
# ======================
#
# TOML 格式。命令行参数会覆盖这里的设置：命令行 > 配置文件 > 默认值
#
# seed_url                 种子列表页，从中发现所有图集链接
# site_origin              图集相对链接前拼接的站点前缀
# referer / user_agent     每个请求都会带上的请求头
# output_dir               图片保存根目录，按图集标题建子目录
# worker_count             同时处理的图集数量（固定 worker 池大小）
# max_concurrent_requests  全局同时进行的 HTTP 请求上限
# delay_min_secs           每个图集开始前随机等待的下限（秒）
# delay_max_secs           每个图集开始前随机等待的上限（秒）
# timeout                  单个请求超时（秒）
# max_body_bytes           单个响应体的最大字节数
# log_file / log_max_size  日志文件路径与轮转阈值（字节）
#
# 使用示例：
#   atlas-spider                                   # 使用配置中的种子页
#   atlas-spider https://www.woyaogexing.com/touxiang/index_3.html
#   atlas-spider -w 4 -o ./pictures                # 4 个 worker，保存到 ./pictures
"#.to_string()
    }

    /// 校验配置合法性
    pub fn validate(&self) -> CrawlResult<()> {
        if !validator::is_valid_url(&self.seed_url) {
            return Err(CrawlError::invalid_url(self.seed_url.clone()));
        }
        if !validator::is_valid_url(&self.site_origin) {
            return Err(CrawlError::invalid_url(self.site_origin.clone()));
        }
        validator::validate_worker_count(self.worker_count)
            .map_err(|e| CrawlError::config_error(e.to_string()))?;
        if self.max_concurrent_requests == 0 {
            return Err(CrawlError::config_error("请求并发数必须大于0"));
        }
        validator::validate_delay_range(self.delay_min_secs, self.delay_max_secs)
            .map_err(|e| CrawlError::config_error(e.to_string()))?;
        validator::validate_output_dir(&self.output_dir)
            .map_err(|e| CrawlError::config_error(e.to_string()))?;
        if self.timeout == 0 {
            return Err(CrawlError::config_error("超时时间必须大于0"));
        }
        if self.max_body_bytes == 0 {
            return Err(CrawlError::config_error("响应体上限必须大于0"));
        }
        Ok(())
    }

    /// 合并命令行参数到配置
    pub fn merge_from_args(&mut self, args: &crate::cli::Args) {
        if let Some(seed_url) = &args.seed_url {
            self.seed_url = seed_url.clone();
        }
        if let Some(output_dir) = &args.output_dir {
            self.output_dir = output_dir.clone();
        }
        if let Some(workers) = args.workers {
            self.worker_count = workers;
        }
        if args.no_delay {
            self.delay_min_secs = 0.0;
            self.delay_max_secs = 0.0;
        }
    }

    /// 请求默认携带的请求头
    pub fn default_headers(&self) -> Vec<(String, String)> {
        vec![
            ("Referer".to_string(), self.referer.clone()),
            ("User-Agent".to_string(), self.user_agent.clone()),
        ]
    }

    /// 获取配置摘要信息
    pub fn get_summary(&self) -> String {
        format!(
            "配置摘要:\n\
            - 种子页: {}\n\
            - 保存目录: {}\n\
            - worker 数: {}\n\
            - 请求并发数: {}\n\
            - 随机等待: {:.1}-{:.1} 秒\n\
            - 超时时间: {} 秒",
            self.seed_url,
            self.output_dir,
            self.worker_count,
            self.max_concurrent_requests,
            self.delay_min_secs,
            self.delay_max_secs,
            self.timeout,
        )
    }
}
