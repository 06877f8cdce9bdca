//! atlas-spider: 从列表页发现图集，抓取图集页中的图片并按 URL 的 md5 保存

pub mod cli;
pub mod config;
pub mod core;
pub mod ui;
pub mod utils;
