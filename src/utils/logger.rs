use actix::prelude::*;
use chrono::Local;
use log::Level;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;

/// 日志消息
pub struct LogMsg {
    pub level: Level,
    pub message: String,
}
impl Message for LogMsg { type Result = (); }

/// 立即刷盘
pub struct FlushLog;
impl Message for FlushLog { type Result = (); }

/// 文件日志 Actor，超过 `max_size` 时轮转到 `<file>.backup`
pub struct LoggerActor {
    writer: BufWriter<File>,
    level: Level,
    file_path: PathBuf,
    max_size: u64,
    current_size: u64,
}

impl LoggerActor {
    pub fn new(file_path: impl AsRef<Path>, level: Level, max_size: u64) -> Result<Self, std::io::Error> {
        let file_path = file_path.as_ref().to_path_buf();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&file_path)?;
        let current_size = file.metadata().map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            writer: BufWriter::new(file),
            level,
            file_path,
            max_size,
            current_size,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, std::io::Error> {
        Self::new(&config.log_file, Level::Info, config.log_max_size)
    }

    fn backup_path(&self) -> PathBuf {
        let mut name = self.file_path.as_os_str().to_owned();
        name.push(".backup");
        PathBuf::from(name)
    }

    fn check_rotation(&mut self) -> Result<(), std::io::Error> {
        if self.current_size > self.max_size {
            self.writer.flush()?;
            let backup_path = self.backup_path();
            if backup_path.exists() {
                std::fs::remove_file(&backup_path)?;
            }
            std::fs::rename(&self.file_path, &backup_path)?;

            let file = OpenOptions::new().create(true).append(true).open(&self.file_path)?;
            self.writer = BufWriter::new(file);
            self.current_size = 0;
        }
        Ok(())
    }

    fn write_log(&mut self, level: Level, message: &str) -> Result<(), std::io::Error> {
        if level > self.level {
            return Ok(());
        }
        let entry = format!(
            "{} [{}] - {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            level,
            message
        );
        self.check_rotation()?;
        self.writer.write_all(entry.as_bytes())?;
        self.current_size += entry.len() as u64;
        if level <= Level::Warn {
            self.writer.flush()?;
        }
        Ok(())
    }
}

impl Actor for LoggerActor {
    type Context = Context<Self>;

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        let _ = self.writer.flush();
    }
}

impl Handler<LogMsg> for LoggerActor {
    type Result = ();
    fn handle(&mut self, msg: LogMsg, _ctx: &mut Self::Context) {
        if let Err(e) = self.write_log(msg.level, &msg.message) {
            eprintln!("日志写入失败: {}", e);
        }
    }
}

impl Handler<FlushLog> for LoggerActor {
    type Result = ();
    fn handle(&mut self, _msg: FlushLog, _ctx: &mut Self::Context) {
        if let Err(e) = self.writer.flush() {
            eprintln!("日志刷盘失败: {}", e);
        }
    }
}

/// 为 `Addr<LoggerActor>` 提供的便捷方法
pub trait LoggerExt {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn debug(&self, message: &str);
}

impl LoggerExt for Addr<LoggerActor> {
    fn info(&self, message: &str) {
        self.do_send(LogMsg { level: Level::Info, message: message.to_string() });
    }

    fn error(&self, message: &str) {
        self.do_send(LogMsg { level: Level::Error, message: message.to_string() });
    }

    fn warn(&self, message: &str) {
        self.do_send(LogMsg { level: Level::Warn, message: message.to_string() });
    }

    fn debug(&self, message: &str) {
        self.do_send(LogMsg { level: Level::Debug, message: message.to_string() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[actix_rt::test]
    async fn test_logger_filters_by_level() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("logs").join("spider.log");
        let logger = LoggerActor::new(&path, Level::Info, 1024 * 1024).unwrap().start();

        logger.info("开始爬取");
        logger.debug("不应写入");
        logger.error("下载失败");
        logger.send(FlushLog).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[INFO] - 开始爬取"));
        assert!(content.contains("[ERROR] - 下载失败"));
        assert!(!content.contains("不应写入"));
    }

    #[actix_rt::test]
    async fn test_logger_rotates_past_max_size() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("spider.log");
        let logger = LoggerActor::new(&path, Level::Info, 16).unwrap().start();

        logger.info("first line that is long enough");
        logger.info("second line");
        logger.send(FlushLog).await.unwrap();

        let backup = temp.path().join("spider.log.backup");
        assert!(backup.exists());
        let current = std::fs::read_to_string(&path).unwrap();
        assert!(current.contains("second line"));
        assert!(!current.contains("first line"));
    }
}
