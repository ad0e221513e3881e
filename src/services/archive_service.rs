//! 归档服务 - 业务能力层
//!
//! 把一个目录压缩成单个 zip 文件，条目路径相对于源目录

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{AppError, AppResult, ArchiveError};

#[async_trait]
pub trait ArchiveService: Send + Sync {
    /// 返回写入的条目数
    async fn compress_directory(&self, source_dir: &Path, destination: &Path) -> AppResult<usize>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ZipArchiveService;

impl ZipArchiveService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ArchiveService for ZipArchiveService {
    async fn compress_directory(&self, source_dir: &Path, destination: &Path) -> AppResult<usize> {
        let source_dir = source_dir.to_path_buf();
        let destination = destination.to_path_buf();
        tokio::task::spawn_blocking(move || zip_directory(&source_dir, &destination)).await?
    }
}

fn zip_directory(source_dir: &Path, destination: &Path) -> AppResult<usize> {
    if !source_dir.is_dir() {
        return Err(ArchiveError::SourceDirMissing {
            path: source_dir.display().to_string(),
        }
        .into());
    }

    let zip_failed = |source: zip::result::ZipError| ArchiveError::ZipFailed {
        path: destination.display().to_string(),
        source,
    };

    let mut files = Vec::new();
    collect_files(source_dir, source_dir, &mut files)?;
    files.sort();

    let file = File::create(destination).map_err(|e| AppError::file_write_failed(destination, e))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (entry_name, path) in &files {
        debug!("压缩: {}", entry_name);
        writer
            .start_file(entry_name.as_str(), options)
            .map_err(zip_failed)?;
        let mut input = File::open(path).map_err(|e| AppError::file_read_failed(path, e))?;
        io::copy(&mut input, &mut writer).map_err(|e| AppError::file_write_failed(destination, e))?;
    }

    writer.finish().map_err(zip_failed)?;
    info!(
        "📦 已归档 {} 个文件: {}",
        files.len(),
        destination.display()
    );
    Ok(files.len())
}

/// 递归收集 (zip 内路径, 磁盘路径)，zip 内统一用 `/` 分隔
fn collect_files(
    root: &Path,
    dir: &Path,
    out: &mut Vec<(String, PathBuf)>,
) -> AppResult<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| AppError::file_read_failed(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| AppError::file_read_failed(dir, e))?.path();
        if path.is_dir() {
            collect_files(root, &path, out)?;
        } else if path.is_file() {
            let relative = path.strip_prefix(root).unwrap_or(&path);
            let entry_name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            out.push((entry_name, path));
        }
    }
    Ok(())
}
