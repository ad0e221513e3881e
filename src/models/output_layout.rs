//! 输出目录布局
//!
//! ```text
//! output/orders/{order_number}.png
//! output/receipts/{order_number}.pdf
//! output/receipts-{timestamp}.zip
//! ```

use std::path::PathBuf;

use chrono::{DateTime, TimeZone};

use crate::error::{AppResult, FileError};
use crate::models::order::ArtifactSet;

/// 归档文件名中的时间格式（精确到秒）
pub const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn orders_dir(&self) -> PathBuf {
        self.root.join("orders")
    }

    pub fn receipts_dir(&self) -> PathBuf {
        self.root.join("receipts")
    }

    pub fn screenshot_path(&self, order_number: &str) -> PathBuf {
        self.orders_dir().join(format!("{}.png", order_number))
    }

    pub fn receipt_path(&self, order_number: &str) -> PathBuf {
        self.receipts_dir().join(format!("{}.pdf", order_number))
    }

    /// 订单的产物路径完全由订单号决定
    pub fn artifact_set(&self, order_number: &str) -> ArtifactSet {
        ArtifactSet {
            order_number: order_number.to_string(),
            screenshot_path: self.screenshot_path(order_number),
            receipt_path: self.receipt_path(order_number),
        }
    }

    /// 同一秒内完成的两次运行会得到相同的文件名
    pub fn archive_path<Tz>(&self, now: &DateTime<Tz>) -> PathBuf
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        self.root.join(format!(
            "receipts-{}.zip",
            now.format(ARCHIVE_TIMESTAMP_FORMAT)
        ))
    }

    /// 创建 orders / receipts 目录
    pub async fn prepare(&self) -> AppResult<()> {
        for dir in [self.orders_dir(), self.receipts_dir()] {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|source| FileError::CreateDirFailed {
                    path: dir.display().to_string(),
                    source,
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, Utc};
    use std::path::Path;

    #[test]
    fn test_paths_derive_from_order_number() {
        let layout = OutputLayout::new("output");
        let set = layout.artifact_set("42");
        assert_eq!(set.screenshot_path, Path::new("output/orders/42.png"));
        assert_eq!(set.receipt_path, Path::new("output/receipts/42.pdf"));
    }

    #[test]
    fn test_archive_name_has_second_resolution() {
        let layout = OutputLayout::new("output");
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(
            layout.archive_path(&now),
            Path::new("output/receipts-2024-03-09-07-05-01.zip")
        );
    }

    #[test]
    fn test_archive_names_collide_within_same_second() {
        // 已知限制：归档名只精确到秒，不做去重
        let layout = OutputLayout::new("output");
        let first = Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let second = first + chrono::Duration::milliseconds(900);
        assert_eq!(layout.archive_path(&first), layout.archive_path(&second));
    }

    #[tokio::test]
    async fn test_prepare_creates_working_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path().join("output"));
        layout.prepare().await.unwrap();
        layout.prepare().await.unwrap();
        assert!(layout.orders_dir().is_dir());
        assert!(layout.receipts_dir().is_dir());
    }
}
