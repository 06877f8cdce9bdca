//! HTTP 客户端封装
//!
//! 每次调用只发出一个请求，不做重试。所有请求共享同一个信号量，
//! 由 `max_concurrent_requests` 限制全局在途请求数。

use async_trait::async_trait;
use awc::http::Method;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::config::Config;
use crate::core::error::{CrawlError, CrawlResult};

/// 单次请求的参数
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub url: String,
    pub method: Option<Method>,
    pub params: Vec<(String, String)>,
    pub form: Option<Vec<(String, String)>>,
    pub json: Option<serde_json::Value>,
    pub headers: Vec<(String, String)>,
    pub allow_redirects: bool,
}

impl RequestOptions {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: None,
            params: Vec::new(),
            form: None,
            json: None,
            headers: Vec::new(),
            allow_redirects: true,
        }
    }

    pub fn post_form(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self { form: Some(form), ..Self::get(url) }
    }

    pub fn post_json(url: impl Into<String>, json: serde_json::Value) -> Self {
        Self { json: Some(json), ..Self::get(url) }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn no_redirects(mut self) -> Self {
        self.allow_redirects = false;
        self
    }

    /// 有请求体或显式指定 POST 时用 POST，否则 GET
    pub fn effective_method(&self) -> Method {
        match &self.method {
            Some(method) if *method != Method::GET => method.clone(),
            _ if self.form.is_some() || self.json.is_some() => Method::POST,
            Some(method) => method.clone(),
            None => Method::GET,
        }
    }
}

/// 爬取流程使用的抓取接口，测试里可以替换成桩实现
#[async_trait(?Send)]
pub trait Fetcher {
    async fn fetch_text(&self, url: &str) -> CrawlResult<String>;
    async fn fetch_bytes(&self, url: &str) -> CrawlResult<Bytes>;
}

pub struct HttpClient {
    client: awc::Client,
    no_redirect_client: awc::Client,
    limiter: Arc<Semaphore>,
    max_body_bytes: usize,
}

impl HttpClient {
    /// 必须在 actix 运行时中创建
    pub fn new(config: &Config) -> Self {
        let timeout = Duration::from_secs(config.timeout);
        let headers = config.default_headers();
        Self {
            client: build_client(timeout, &headers, true),
            no_redirect_client: build_client(timeout, &headers, false),
            limiter: Arc::new(Semaphore::new(config.max_concurrent_requests)),
            max_body_bytes: config.max_body_bytes,
        }
    }

    pub fn available_permits(&self) -> usize {
        self.limiter.available_permits()
    }

    pub async fn request(&self, options: &RequestOptions) -> CrawlResult<Bytes> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|e| CrawlError::unknown(format!("请求限流器已关闭: {}", e)))?;

        let client = if options.allow_redirects { &self.client } else { &self.no_redirect_client };
        let method = options.effective_method();
        log::debug!("{} {}", method, options.url);

        let mut request = client.request(method, options.url.as_str());
        for (name, value) in &options.headers {
            request = request.insert_header((name.as_str(), value.as_str()));
        }
        if !options.params.is_empty() {
            request = request
                .query(&options.params)
                .map_err(|e| CrawlError::invalid_url(format!("{}: {}", options.url, e)))?;
        }

        let sent = if let Some(json) = &options.json {
            request.send_json(json).await
        } else if let Some(form) = &options.form {
            request.send_form(form).await
        } else {
            request.send().await
        };
        let mut response =
            sent.map_err(|e| CrawlError::network_error(format!("{}: {}", options.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::server_error(format!("{} 返回 {}", options.url, status)));
        }

        response
            .body()
            .limit(self.max_body_bytes)
            .await
            .map_err(|e| CrawlError::network_error(format!("{}: 读取响应失败: {}", options.url, e)))
    }

    pub async fn request_text(&self, options: &RequestOptions) -> CrawlResult<String> {
        let body = self.request(options).await?;
        Ok(decode_text(&options.url, body))
    }
}

/// 按 UTF-8 解码响应体，非法字节替换为 U+FFFD 并记录警告
fn decode_text(url: &str, body: Bytes) -> String {
    match String::from_utf8(body.to_vec()) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("{} 的响应不是合法 UTF-8，非法字节已替换: {}", url, e.utf8_error());
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    }
}

fn build_client(timeout: Duration, headers: &[(String, String)], follow_redirects: bool) -> awc::Client {
    let mut builder = awc::Client::builder().timeout(timeout);
    for (name, value) in headers {
        builder = builder.add_default_header((name.as_str(), value.as_str()));
    }
    if !follow_redirects {
        builder = builder.disable_redirects();
    }
    builder.finish()
}

#[async_trait(?Send)]
impl Fetcher for HttpClient {
    async fn fetch_text(&self, url: &str) -> CrawlResult<String> {
        self.request_text(&RequestOptions::get(url)).await
    }

    async fn fetch_bytes(&self, url: &str) -> CrawlResult<Bytes> {
        self.request(&RequestOptions::get(url)).await
    }
}
