use std::borrow::Cow;
use std::io;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum CrawlError {
    #[error("网络错误: {0}")]
    NetworkError(Cow<'static, str>),

    #[error("服务器错误: {0}")]
    ServerError(Cow<'static, str>),

    #[error("IO错误: {0}")]
    IoError(Cow<'static, str>),

    #[error("无效的URL: {0}")]
    InvalidUrl(Cow<'static, str>),

    #[error("页面解析失败: {0}")]
    ParseError(Cow<'static, str>),

    #[error("配置错误: {0}")]
    ConfigError(Cow<'static, str>),

    #[error("未知错误: {0}")]
    Unknown(Cow<'static, str>),
}

impl CrawlError {
    pub fn network_error(msg: impl Into<Cow<'static, str>>) -> Self {
        CrawlError::NetworkError(msg.into())
    }

    pub fn server_error(msg: impl Into<Cow<'static, str>>) -> Self {
        CrawlError::ServerError(msg.into())
    }

    pub fn invalid_url(msg: impl Into<Cow<'static, str>>) -> Self {
        CrawlError::InvalidUrl(msg.into())
    }

    pub fn parse_error(msg: impl Into<Cow<'static, str>>) -> Self {
        CrawlError::ParseError(msg.into())
    }

    pub fn config_error(msg: impl Into<Cow<'static, str>>) -> Self {
        CrawlError::ConfigError(msg.into())
    }

    pub fn unknown(msg: impl Into<Cow<'static, str>>) -> Self {
        CrawlError::Unknown(msg.into())
    }

    /// 网络层面的失败（连接、超时、非2xx状态码）
    pub fn is_network(&self) -> bool {
        matches!(self, CrawlError::NetworkError(_) | CrawlError::ServerError(_))
    }
}

impl From<io::Error> for CrawlError {
    fn from(error: io::Error) -> Self {
        CrawlError::IoError(error.to_string().into())
    }
}

impl From<String> for CrawlError {
    fn from(error: String) -> Self {
        CrawlError::Unknown(error.into())
    }
}

impl From<&str> for CrawlError {
    fn from(error: &str) -> Self {
        CrawlError::Unknown(error.to_string().into())
    }
}

pub type CrawlResult<T> = Result<T, CrawlError>;
