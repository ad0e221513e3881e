//! 批量订单处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责整批订单的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动浏览器、创建下单页面和渲染页面
//! 2. **会话配置**：设置交互节奏，打开下单页面并关闭弹窗
//! 3. **加载订单**：一次性获取全部订单（`Vec<OrderRecord>`）
//! 4. **顺序处理**：逐个订单交给 `OrderFlow`，任一订单失败即终止整批
//! 5. **归档清理**：全部成功后压缩回执目录，再清空工作目录
//!
//! ## 设计特点
//!
//! - **资源所有者**：唯一持有 Browser 和会话的模块，按 `&mut` 借给流程层
//! - **无并发**：会话是有状态的单一资源，订单 N+1 只会在订单 N 返回后开始

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chromiumoxide::Browser;
use tracing::{error, info, warn};

use crate::browser;
use crate::config::{Config, FormSelectors};
use crate::error::AppResult;
use crate::infrastructure::{ChromiumSession, InteractiveSession, JsExecutor};
use crate::models::{ArtifactSet, OutputLayout, RunArtifacts};
use crate::services::{
    clear_directory, dismiss_popup, ArchiveService, DocumentService, HttpCsvOrderSource,
    OrderSource, PdfDocumentService, ZipArchiveService,
};
use crate::utils::logging;
use crate::workflow::{OrderCtx, OrderFlow, RetryPolicy};

/// 一次批处理的结果
#[derive(Debug)]
pub struct RunReport {
    pub orders_processed: usize,
    /// 归档前的产物路径（归档后工作目录已清空）
    pub artifacts: Vec<ArtifactSet>,
    pub archive_path: Option<PathBuf>,
    pub elapsed: Duration,
}

/// 批处理编排器
///
/// 持有订单源、文档服务和归档服务，会话由调用方按 `&mut` 借入。
pub struct BatchProcessor {
    target_url: String,
    slow_mo: Duration,
    selectors: FormSelectors,
    retry: RetryPolicy,
    layout: OutputLayout,
    order_source: Box<dyn OrderSource>,
    documents: Arc<dyn DocumentService>,
    archiver: Box<dyn ArchiveService>,
}

impl BatchProcessor {
    pub fn new(
        config: &Config,
        order_source: Box<dyn OrderSource>,
        documents: Arc<dyn DocumentService>,
        archiver: Box<dyn ArchiveService>,
    ) -> Self {
        Self {
            target_url: config.target_url.clone(),
            slow_mo: config.slow_mo(),
            selectors: config.selectors.clone(),
            retry: config.retry_policy(),
            layout: OutputLayout::new(&config.output_dir),
            order_source,
            documents,
            archiver,
        }
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// 运行整个批次
    ///
    /// 任一步骤失败立即返回：不归档、不清理，已生成的产物留在磁盘上。
    pub async fn run(&self, session: &mut dyn InteractiveSession) -> AppResult<RunReport> {
        let started = Instant::now();

        session.set_slow_mo(self.slow_mo);
        self.layout.prepare().await?;

        info!("🌐 打开下单页面: {}", self.target_url);
        session.navigate(&self.target_url).await?;
        dismiss_popup(session, &self.selectors).await;

        let orders = self.order_source.fetch().await?;
        if orders.is_empty() {
            warn!("⚠️ 没有找到待处理的订单，程序结束");
            return Ok(RunReport {
                orders_processed: 0,
                artifacts: Vec::new(),
                archive_path: None,
                elapsed: started.elapsed(),
            });
        }

        let total = orders.len();
        logging::log_orders_loaded(total);

        let flow = OrderFlow::new(
            self.selectors.clone(),
            self.retry,
            self.layout.clone(),
            self.documents.clone(),
        );

        let mut run_artifacts = RunArtifacts::new();
        for (idx, record) in orders.iter().enumerate() {
            let ctx = OrderCtx::new(record.order_number.clone(), idx + 1, total);
            logging::log_order_start(ctx.order_index, total, &ctx.order_number);

            let artifacts = flow.run(session, record, &ctx).await.map_err(|e| {
                error!("{} ❌ 处理失败，终止整个批次: {}", ctx, e);
                e
            })?;
            run_artifacts.push(artifacts);
        }

        let archive_path = self.archive_and_cleanup(&run_artifacts).await?;

        let report = RunReport {
            orders_processed: run_artifacts.len(),
            artifacts: run_artifacts.into_vec(),
            archive_path: Some(archive_path),
            elapsed: started.elapsed(),
        };
        logging::print_final_stats(
            report.orders_processed,
            report.archive_path.as_deref(),
            report.elapsed,
        );
        Ok(report)
    }

    /// 归档回执目录，然后清空截图和回执目录
    async fn archive_and_cleanup(&self, run_artifacts: &RunArtifacts) -> AppResult<PathBuf> {
        run_artifacts.verify_on_disk()?;

        let receipts_dir = self.layout.receipts_dir();
        let archive_path = self.layout.archive_path(&chrono::Local::now());
        info!("📦 正在归档回执: {}", archive_path.display());
        let entries = self
            .archiver
            .compress_directory(&receipts_dir, &archive_path)
            .await?;
        if entries != run_artifacts.len() {
            warn!(
                "⚠️ 回执目录中有 {} 个文件，本次生成 {} 个回执",
                entries,
                run_artifacts.len()
            );
        }

        clear_directory(&self.layout.orders_dir()).await?;
        clear_directory(&receipts_dir).await?;

        Ok(archive_path)
    }
}

/// 应用主结构
pub struct App {
    _browser: Browser,
    session: ChromiumSession,
    processor: BatchProcessor,
}

impl App {
    /// 初始化应用：获取浏览器、创建下单页和渲染页、组装服务
    pub async fn initialize(config: Config) -> AppResult<Self> {
        logging::log_startup(&config);

        let (browser, page) = match config.browser_debug_port {
            Some(port) => browser::connect_to_browser(port).await?,
            None => {
                browser::launch_browser(config.headless, config.chrome_executable.as_deref())
                    .await?
            }
        };
        let render_page = browser::new_blank_page(&browser).await?;

        let session = ChromiumSession::new(JsExecutor::new(page));
        let processor = BatchProcessor::new(
            &config,
            Box::new(HttpCsvOrderSource::new(
                &config.orders_csv_url,
                &config.orders_cache_file,
            )),
            Arc::new(PdfDocumentService::new(render_page)),
            Box::new(ZipArchiveService::new()),
        );

        Ok(Self {
            _browser: browser,
            session,
            processor,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&mut self) -> AppResult<RunReport> {
        self.processor.run(&mut self.session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::test_support::{RecordingDocuments, ScriptedSession};
    use crate::models::OrderRecord;
    use crate::services::StaticOrderSource;

    fn processor(root: &std::path::Path, orders: Vec<OrderRecord>) -> BatchProcessor {
        let config = Config {
            output_dir: root.display().to_string(),
            submit_backoff_ms: 0,
            ..Config::default()
        };
        BatchProcessor::new(
            &config,
            Box::new(StaticOrderSource::new(orders)),
            Arc::new(RecordingDocuments::default()),
            Box::new(ZipArchiveService::new()),
        )
    }

    #[tokio::test]
    async fn test_session_is_configured_and_opened_first() {
        let dir = tempfile::tempdir().unwrap();
        let processor = processor(dir.path(), vec![OrderRecord::new("1", "1", "1", "1", "a")]);
        let mut session = ScriptedSession::new().receipt_after(1).with_popup();

        processor.run(&mut session).await.unwrap();

        assert_eq!(session.slow_mo, Duration::from_millis(100));
        assert_eq!(
            &session.calls[..3],
            &[
                "navigate https://robotsparebinindustries.com/#/robot-order",
                "query .modal-content",
                "click .modal-content button",
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_dataset_skips_archive() {
        let dir = tempfile::tempdir().unwrap();
        let processor = processor(dir.path(), Vec::new());
        let mut session = ScriptedSession::new();

        let report = processor.run(&mut session).await.unwrap();

        assert_eq!(report.orders_processed, 0);
        assert!(report.archive_path.is_none());
    }

    #[tokio::test]
    async fn test_failure_aborts_before_archive_and_keeps_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let orders = vec![
            OrderRecord::new("1", "1", "1", "1", "a"),
            OrderRecord::new("2", "2", "2", "2", "b"),
            OrderRecord::new("3", "3", "3", "3", "c"),
        ];
        let processor = processor(dir.path(), orders);
        // 第二个订单的 body 单选框不存在
        let mut session = ScriptedSession::new().receipt_after(1).missing("#id-body-2");

        let err = processor.run(&mut session).await.unwrap_err();

        assert!(err.to_string().contains("订单 2"));
        let layout = processor.layout();
        assert!(layout.screenshot_path("1").is_file());
        assert!(layout.receipt_path("1").is_file());
        assert!(!layout.screenshot_path("3").exists());
        let zips = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "zip"))
            .count();
        assert_eq!(zips, 0);
    }
}
