use anyhow::Result;
use url::Url;

/// 只接受可解析的 http/https 地址
pub fn is_valid_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some(),
        Err(_) => false,
    }
}

pub fn validate_worker_count(workers: usize) -> Result<()> {
    if workers == 0 {
        anyhow::bail!("worker 数必须大于0");
    }
    if workers > 64 {
        anyhow::bail!("worker 数不能超过64");
    }
    Ok(())
}

pub fn validate_delay_range(min_secs: f64, max_secs: f64) -> Result<()> {
    if !min_secs.is_finite() || !max_secs.is_finite() {
        anyhow::bail!("等待时间必须是有限数值");
    }
    if min_secs < 0.0 {
        anyhow::bail!("等待时间不能为负数");
    }
    if min_secs > max_secs {
        anyhow::bail!("等待下限 {} 大于上限 {}", min_secs, max_secs);
    }
    Ok(())
}

pub fn validate_output_dir(path: &str) -> Result<()> {
    if path.trim().is_empty() {
        anyhow::bail!("保存目录不能为空");
    }
    Ok(())
}
