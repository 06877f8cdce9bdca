//! 列表页与图集页的正则提取规则

use regex::Regex;

use crate::core::error::{CrawlError, CrawlResult};
use crate::core::storage::{is_usable_dir_name, sanitize_title};

const ATLAS_LINK_PATTERN: &str =
    r#"<a href="(.*?)" class="imgTitle" target="_blank" title=".*?">.*?</a>"#;
const IMAGE_LINK_PATTERN: &str = r#"<a href="(.*?)" class="swipebox">"#;
const TITLE_PATTERN: &str = r#"<meta name="Description" content="(.*?)">"#;

/// 图片地址是协议相对路径（`//img...`），统一补上 https
const IMAGE_SCHEME_PREFIX: &str = "https:";

/// 一个图集页的解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gallery {
    pub title: String,
    pub image_urls: Vec<String>,
}

pub struct AtlasParser {
    atlas_link: Regex,
    image_link: Regex,
    title: Regex,
}

impl AtlasParser {
    pub fn new() -> CrawlResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| CrawlError::unknown(format!("正则编译失败: {}", e)))
        };
        Ok(Self {
            atlas_link: compile(ATLAS_LINK_PATTERN)?,
            image_link: compile(IMAGE_LINK_PATTERN)?,
            title: compile(TITLE_PATTERN)?,
        })
    }

    /// 从列表页提取图集地址，拼接站点前缀。没有匹配时返回空列表
    pub fn parse_atlas_links(&self, html: &str, site_origin: &str) -> Vec<String> {
        self.atlas_link
            .captures_iter(html)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|href| !href.is_empty())
            .map(|href| format!("{}{}", site_origin, href))
            .collect()
    }

    pub fn parse_image_urls(&self, html: &str) -> Vec<String> {
        self.image_link
            .captures_iter(html)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|href| !href.is_empty())
            .map(|href| format!("{}{}", IMAGE_SCHEME_PREFIX, href))
            .collect()
    }

    /// 取第一个 Description meta 作为标题
    pub fn parse_title(&self, html: &str) -> Option<String> {
        self.title
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    pub fn parse_gallery(&self, html: &str) -> CrawlResult<Gallery> {
        let title = self
            .parse_title(html)
            .ok_or_else(|| CrawlError::parse_error("图集页缺少 Description 标题"))?;
        if !is_usable_dir_name(&sanitize_title(&title)) {
            return Err(CrawlError::parse_error(format!("图集标题不能作为目录名: {:?}", title)));
        }
        Ok(Gallery {
            title,
            image_urls: self.parse_image_urls(html),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <div class="txList">
          <a href="/touxiang/nv/2023/1.html" class="imgTitle" target="_blank" title="甜美">甜美女生头像</a>
          <a href="" class="imgTitle" target="_blank" title="空">空链接</a>
          <a href="/touxiang/nan/2023/2.html" class="imgTitle" target="_blank" title="帅气">帅气男生头像</a>
          <a href="/other.html" class="img">不匹配</a>
        </div>"#;

    const GALLERY: &str = r#"
        <head><meta name="Description" content="甜美 女生/头像"><meta name="Description" content="第二个"></head>
        <a href="//img2.woyaogexing.com/a.jpeg" class="swipebox"><img></a>
        <a href="" class="swipebox"></a>
        <a href="//img2.woyaogexing.com/b.jpeg" class="swipebox"><img></a>"#;

    #[test]
    fn test_parse_atlas_links_prefixes_origin() {
        let parser = AtlasParser::new().unwrap();
        let links = parser.parse_atlas_links(LISTING, "https://www.woyaogexing.com");
        assert_eq!(
            links,
            vec![
                "https://www.woyaogexing.com/touxiang/nv/2023/1.html",
                "https://www.woyaogexing.com/touxiang/nan/2023/2.html",
            ]
        );
    }

    #[test]
    fn test_parse_atlas_links_no_match_is_empty() {
        let parser = AtlasParser::new().unwrap();
        assert!(parser.parse_atlas_links("<html></html>", "https://x.com").is_empty());
    }

    #[test]
    fn test_parse_gallery() {
        let parser = AtlasParser::new().unwrap();
        let gallery = parser.parse_gallery(GALLERY).unwrap();
        assert_eq!(gallery.title, "甜美 女生/头像");
        assert_eq!(
            gallery.image_urls,
            vec![
                "https://img2.woyaogexing.com/a.jpeg",
                "https://img2.woyaogexing.com/b.jpeg",
            ]
        );
    }

    #[test]
    fn test_parse_gallery_without_title_fails() {
        let parser = AtlasParser::new().unwrap();
        let html = r#"<a href="//img/a.jpg" class="swipebox">"#;
        assert!(matches!(parser.parse_gallery(html), Err(CrawlError::ParseError(_))));
    }

    #[test]
    fn test_parse_gallery_rejects_dot_and_empty_titles() {
        let parser = AtlasParser::new().unwrap();
        for title in ["", ".", ".."] {
            let html = format!(r#"<meta name="Description" content="{}"><a href="//img/a.jpg" class="swipebox">"#, title);
            assert!(
                matches!(parser.parse_gallery(&html), Err(CrawlError::ParseError(_))),
                "标题 {:?} 应解析失败",
                title
            );
        }

        let html = r#"<meta name="Description" content="../..">"#;
        assert_eq!(parser.parse_gallery(html).unwrap().title, "../..");
    }

    #[test]
    fn test_parse_gallery_without_images_is_ok() {
        let parser = AtlasParser::new().unwrap();
        let gallery = parser.parse_gallery(r#"<meta name="Description" content="空图集">"#).unwrap();
        assert_eq!(gallery.title, "空图集");
        assert!(gallery.image_urls.is_empty());
    }
}
