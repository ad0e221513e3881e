//! 订单与产物模型

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{AppResult, FileError};

/// 一条订单记录（CSV 中的一行）
///
/// 由订单源创建，之后不再修改。订单号在同一批次内唯一，
/// 并用于命名该订单的所有产物文件。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderRecord {
    #[serde(rename = "Order number")]
    pub order_number: String,
    #[serde(rename = "Head")]
    pub head: String,
    #[serde(rename = "Body")]
    pub body: String,
    #[serde(rename = "Legs")]
    pub legs: String,
    #[serde(rename = "Address")]
    pub address: String,
}

impl OrderRecord {
    pub fn new(
        order_number: impl Into<String>,
        head: impl Into<String>,
        body: impl Into<String>,
        legs: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            order_number: order_number.into(),
            head: head.into(),
            body: body.into(),
            legs: legs.into(),
            address: address.into(),
        }
    }
}

/// 单个订单的产物：机器人截图 + PDF 回执
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSet {
    pub order_number: String,
    pub screenshot_path: PathBuf,
    pub receipt_path: PathBuf,
}

impl ArtifactSet {
    /// 两个文件都必须已经落盘
    pub fn verify_on_disk(&self) -> AppResult<()> {
        for path in [&self.screenshot_path, &self.receipt_path] {
            if !path.is_file() {
                return Err(FileError::ArtifactMissing {
                    path: path.display().to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// 整个批次累积的产物，在归档时被消费一次
#[derive(Debug, Default)]
pub struct RunArtifacts {
    sets: Vec<ArtifactSet>,
}

impl RunArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, set: ArtifactSet) {
        self.sets.push(set);
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn verify_on_disk(&self) -> AppResult<()> {
        self.sets.iter().try_for_each(ArtifactSet::verify_on_disk)
    }

    pub fn into_vec(self) -> Vec<ArtifactSet> {
        self.sets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let screenshot = dir.path().join("1.png");
        std::fs::write(&screenshot, b"png").unwrap();

        let set = ArtifactSet {
            order_number: "1".to_string(),
            screenshot_path: screenshot,
            receipt_path: dir.path().join("1.pdf"),
        };

        let err = set.verify_on_disk().unwrap_err();
        assert!(err.to_string().contains("1.pdf"));

        std::fs::write(&set.receipt_path, b"pdf").unwrap();
        assert!(set.verify_on_disk().is_ok());
    }

    #[test]
    fn test_run_artifacts_verify_every_set() {
        let dir = tempfile::tempdir().unwrap();
        let mut run = RunArtifacts::new();
        assert!(run.is_empty());
        assert!(run.verify_on_disk().is_ok());

        for n in ["1", "2"] {
            let screenshot_path = dir.path().join(format!("{n}.png"));
            let receipt_path = dir.path().join(format!("{n}.pdf"));
            std::fs::write(&screenshot_path, b"png").unwrap();
            std::fs::write(&receipt_path, b"pdf").unwrap();
            run.push(ArtifactSet {
                order_number: n.to_string(),
                screenshot_path,
                receipt_path,
            });
        }
        assert_eq!(run.len(), 2);
        assert!(run.verify_on_disk().is_ok());

        std::fs::remove_file(dir.path().join("2.png")).unwrap();
        let err = run.verify_on_disk().unwrap_err();
        assert!(err.to_string().contains("2.png"));
        assert_eq!(run.into_vec().len(), 2);
    }
}
