use std::path::PathBuf;

use crate::core::error::{CrawlError, CrawlResult};

/// 文件系统不友好的字符，统一替换为 `-`
const HOSTILE_CHARS: [char; 10] = ['/', '\\', ':', '*', '"', '<', '>', '|', '?', ' '];

pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if HOSTILE_CHARS.contains(&c) { '-' } else { c })
        .collect()
}

/// 清洗后的标题能否作为 `<root>` 下的一级子目录
pub fn is_usable_dir_name(sanitized: &str) -> bool {
    !matches!(sanitized, "" | "." | "..")
}

/// 图片URL（不是图片内容）的 md5 十六进制串，作为文件名主干
pub fn image_file_stem(url: &str) -> String {
    format!("{:x}", md5::compute(url.as_bytes()))
}

/// 图片保存目录：`<root>/<标题>/<md5(url)>.jpg`
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 标题清洗后为空、`.` 或 `..` 时拒绝，保证只写入 `<root>` 的子目录
    pub fn atlas_dir(&self, title: &str) -> CrawlResult<PathBuf> {
        let name = sanitize_title(title);
        if !is_usable_dir_name(&name) {
            return Err(CrawlError::parse_error(format!("标题不能作为目录名: {:?}", title)));
        }
        Ok(self.root.join(name))
    }

    pub fn image_path(&self, title: &str, url: &str) -> CrawlResult<PathBuf> {
        Ok(self.atlas_dir(title)?.join(format!("{}.jpg", image_file_stem(url))))
    }

    /// 确保根目录和图集目录存在，重复调用不报错
    pub async fn ensure_atlas_dir(&self, title: &str) -> CrawlResult<PathBuf> {
        let dir = self.atlas_dir(title)?;
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// 写入图片，同名文件直接覆盖
    pub async fn save(&self, title: &str, url: &str, bytes: &[u8]) -> CrawlResult<PathBuf> {
        let dir = self.ensure_atlas_dir(title).await?;
        let path = dir.join(format!("{}.jpg", image_file_stem(url)));
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_title_replaces_hostile_chars() {
        assert_eq!(sanitize_title(r#"a/b\c:d*e"f<g>h|i?j k"#), "a-b-c-d-e-f-g-h-i-j-k");
    }

    #[test]
    fn test_sanitize_title_keeps_other_chars() {
        assert_eq!(sanitize_title("甜美女生头像_2023.(新)"), "甜美女生头像_2023.(新)");
        assert_eq!(sanitize_title(""), "");
    }

    #[test]
    fn test_image_file_stem_is_deterministic() {
        let url = "https://img2.woyaogexing.com/2023/01/01/a.jpeg";
        assert_eq!(image_file_stem(url), image_file_stem(url));
        assert_eq!(image_file_stem(url).len(), 32);
        assert_ne!(image_file_stem(url), image_file_stem("https://img2.woyaogexing.com/b.jpeg"));
        assert_eq!(image_file_stem(""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_image_path_layout() {
        let store = ImageStore::new("./atlas");
        let path = store.image_path("a b", "https://x/1.jpg").unwrap();
        assert_eq!(
            path,
            PathBuf::from("./atlas").join("a-b").join(format!("{}.jpg", image_file_stem("https://x/1.jpg")))
        );
    }

    #[tokio::test]
    async fn test_ensure_atlas_dir_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = ImageStore::new(temp.path().join("atlas"));

        let first = store.ensure_atlas_dir("同一个标题").await.unwrap();
        let second = store.ensure_atlas_dir("同一个标题").await.unwrap();
        assert_eq!(first, second);
        assert!(first.is_dir());
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let temp = TempDir::new().unwrap();
        let store = ImageStore::new(temp.path());
        let url = "https://img/a.jpg";

        let first = tokio_test::block_on(store.save("t", url, b"old")).unwrap();
        let second = tokio_test::block_on(store.save("t", url, b"new")).unwrap();
        assert_eq!(first, second);
        assert_eq!(std::fs::read(&second).unwrap(), b"new");
        assert_eq!(std::fs::read_dir(store.atlas_dir("t").unwrap()).unwrap().count(), 1);
    }

    #[test]
    fn test_dot_and_empty_titles_are_rejected() {
        assert!(!is_usable_dir_name(""));
        assert!(!is_usable_dir_name("."));
        assert!(!is_usable_dir_name(".."));
        assert!(is_usable_dir_name("..."));
        assert!(is_usable_dir_name(".-"));

        let store = ImageStore::new("./atlas");
        assert!(matches!(store.atlas_dir(".."), Err(CrawlError::ParseError(_))));
        assert!(matches!(store.image_path("", "https://x/1.jpg"), Err(CrawlError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_save_never_writes_outside_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("atlas");
        let store = ImageStore::new(&root);

        for title in ["..", ".", ""] {
            let result = store.save(title, "https://img/a.jpg", b"x").await;
            assert!(matches!(result, Err(CrawlError::ParseError(_))), "标题 {:?} 应被拒绝", title);
        }
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
        assert!(!root.exists());

        // 含 `..` 的普通标题只是一级子目录名
        let path = store.save("../a", "https://img/a.jpg", b"x").await.unwrap();
        assert_eq!(path.parent().unwrap(), root.join("..-a"));
    }
}
