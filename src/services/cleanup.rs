//! 清理工作目录

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, FileError};

/// 删除目录下的所有普通文件，返回删除数量；子目录保留
pub async fn clear_directory(dir: &Path) -> AppResult<usize> {
    if !dir.exists() {
        warn!("⚠️ 目录不存在，跳过清理: {}", dir.display());
        return Ok(0);
    }

    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| AppError::file_read_failed(dir, e))?;

    let mut removed = 0;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::file_read_failed(dir, e))?
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        tokio::fs::remove_file(&path)
            .await
            .map_err(|source| FileError::DeleteFailed {
                path: path.display().to_string(),
                source,
            })?;
        debug!("已删除: {}", path.display());
        removed += 1;
    }

    info!("🗑️ 已清理 {} 个文件: {}", removed, dir.display());
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clear_directory_removes_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("1.png"), b"a").unwrap();
        std::fs::write(dir.path().join("2.png"), b"b").unwrap();
        std::fs::create_dir(dir.path().join("keep")).unwrap();

        let removed = clear_directory(dir.path()).await.unwrap();

        assert_eq!(removed, 2);
        let left: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(left.len(), 1);
        assert!(dir.path().join("keep").is_dir());
    }

    #[tokio::test]
    async fn test_clear_missing_directory_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(clear_directory(&dir.path().join("none")).await.unwrap(), 0);
    }
}
