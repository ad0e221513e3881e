//! 订单源 - 业务能力层
//!
//! 下载订单 CSV 到本地缓存（覆盖旧文件），再解析为订单列表

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{AppError, AppResult, SourceError};
use crate::models::{load_orders_csv, OrderRecord};

#[async_trait]
pub trait OrderSource: Send + Sync {
    /// 一次性取回完整、有序的订单列表
    async fn fetch(&self) -> AppResult<Vec<OrderRecord>>;
}

/// 通过 HTTP 获取 CSV 的订单源
pub struct HttpCsvOrderSource {
    client: reqwest::Client,
    url: String,
    cache_path: PathBuf,
}

impl HttpCsvOrderSource {
    pub fn new(url: impl Into<String>, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            cache_path: cache_path.into(),
        }
    }

    async fn download(&self) -> AppResult<Vec<u8>> {
        let download_failed = |source| SourceError::DownloadFailed {
            url: self.url.clone(),
            source,
        };

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(download_failed)?;

        let bytes = response.bytes().await.map_err(download_failed)?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl OrderSource for HttpCsvOrderSource {
    async fn fetch(&self) -> AppResult<Vec<OrderRecord>> {
        info!("📥 正在下载订单文件: {}", self.url);
        let bytes = self.download().await?;
        debug!("下载完成: {} 字节", bytes.len());

        tokio::fs::write(&self.cache_path, &bytes)
            .await
            .map_err(|e| AppError::file_write_failed(&self.cache_path, e))?;

        load_orders_csv(&self.cache_path).await
    }
}

/// 内存中的固定订单列表
pub struct StaticOrderSource {
    orders: Vec<OrderRecord>,
}

impl StaticOrderSource {
    pub fn new(orders: Vec<OrderRecord>) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl OrderSource for StaticOrderSource {
    async fn fetch(&self) -> AppResult<Vec<OrderRecord>> {
        Ok(self.orders.clone())
    }
}
