//! Core: HTTP 封装、页面解析、任务队列、图集状态 actor 与爬取流程

pub mod error;
pub mod http;
pub mod manager;
pub mod parser;
pub mod queue;
pub mod spider;
pub mod storage;

pub use error::{CrawlError, CrawlResult};
pub use http::{Fetcher, HttpClient, RequestOptions};
pub use manager::{AtlasStatus, CrawlManagerActor, CrawlStats, GetStats, ListFailed};
pub use parser::{AtlasParser, Gallery};
pub use queue::{AtlasTask, TaskQueue};
pub use spider::Spider;
pub use storage::{image_file_stem, sanitize_title, ImageStore};
