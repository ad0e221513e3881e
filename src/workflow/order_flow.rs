//! 订单处理流程 - 流程层
//!
//! 核心职责：定义"一个订单"的完整处理流程
//!
//! 流程顺序（严格按序，不回退、不交叉）：
//! 1. 填写表单（head / body / legs / address → 预览）
//! 2. 提交订单，直到回执出现（有界重试）
//! 3. 保存机器人截图
//! 4. 回执 HTML → PDF
//! 5. 截图嵌入 PDF
//! 6. 点击"再来一单"并关闭弹窗

use std::path::Path;
use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::FormSelectors;
use crate::error::{AppError, AppResult};
use crate::infrastructure::InteractiveSession;
use crate::models::{ArtifactSet, OrderRecord, OutputLayout};
use crate::services::{dismiss_popup, DocumentService, ImageAlignment};
use crate::utils::logging::truncate_text;
use crate::workflow::order_ctx::{OrderCtx, OrderStage};
use crate::workflow::retry_policy::RetryPolicy;

/// 订单处理流程
///
/// - 不持有会话，每次调用时借用
/// - 任何阶段失败都带上阶段信息向上传播，由编排层决定终止
pub struct OrderFlow {
    selectors: FormSelectors,
    retry: RetryPolicy,
    layout: OutputLayout,
    documents: Arc<dyn DocumentService>,
}

impl OrderFlow {
    pub fn new(
        selectors: FormSelectors,
        retry: RetryPolicy,
        layout: OutputLayout,
        documents: Arc<dyn DocumentService>,
    ) -> Self {
        Self {
            selectors,
            retry,
            layout,
            documents,
        }
    }

    pub async fn run(
        &self,
        session: &mut dyn InteractiveSession,
        record: &OrderRecord,
        ctx: &OrderCtx,
    ) -> AppResult<ArtifactSet> {
        let artifacts = self.layout.artifact_set(&record.order_number);
        let at = |stage: OrderStage| {
            let order_number = record.order_number.clone();
            move |e: AppError| e.at_stage(order_number, stage)
        };

        self.fill_form(session, record, ctx)
            .await
            .map_err(at(OrderStage::Fill))?;

        self.submit_with_retry(session, ctx)
            .await
            .map_err(at(OrderStage::Submit))?;

        self.capture_screenshot(session, &artifacts.screenshot_path, ctx)
            .await
            .map_err(at(OrderStage::Screenshot))?;

        self.store_receipt(session, &artifacts.receipt_path, ctx)
            .await
            .map_err(at(OrderStage::Receipt))?;

        self.documents
            .merge_image_into(
                &artifacts.receipt_path,
                &artifacts.screenshot_path,
                ImageAlignment::Center,
            )
            .await
            .map_err(at(OrderStage::Embed))?;

        self.order_another(session, ctx)
            .await
            .map_err(at(OrderStage::Advance))?;

        info!("{} ✅ 订单完成", ctx);
        Ok(artifacts)
    }

    /// 填写表单并点击预览
    async fn fill_form(
        &self,
        session: &mut dyn InteractiveSession,
        record: &OrderRecord,
        ctx: &OrderCtx,
    ) -> AppResult<()> {
        info!(
            "{} 📝 填写表单: head={} body={} legs={} address={}",
            ctx,
            record.head,
            record.body,
            record.legs,
            truncate_text(&record.address, 30)
        );

        session.select_option(&self.selectors.head, &record.head).await?;
        session.click(&self.selectors.body_radio(&record.body)).await?;
        session.fill(&self.selectors.legs, &record.legs).await?;
        session.fill(&self.selectors.address, &record.address).await?;
        session.click(&self.selectors.preview).await?;
        Ok(())
    }

    /// 提交订单，返回实际尝试次数
    ///
    /// 每次点击后检查回执是否出现；失败之间固定等待，最后一次失败后不再等待。
    pub async fn submit_with_retry(
        &self,
        session: &mut dyn InteractiveSession,
        ctx: &OrderCtx,
    ) -> AppResult<u32> {
        info!("{} 📤 正在提交订单...", ctx);

        for attempt in 1..=self.retry.max_attempts {
            session.click(&self.selectors.order).await?;

            if session.is_present(&self.selectors.receipt).await? {
                debug!("{} 第 {} 次提交后出现回执", ctx, attempt);
                return Ok(attempt);
            }

            warn!(
                "{} ⚠️ 未检测到回执 (尝试 {}/{})",
                ctx, attempt, self.retry.max_attempts
            );

            if self.retry.should_retry(attempt) {
                sleep(self.retry.backoff).await;
            }
        }

        Err(AppError::SubmitRetriesExhausted {
            attempts: self.retry.max_attempts,
            indicator: self.selectors.receipt.clone(),
        })
    }

    /// 回执在屏幕上时才能截到预览图
    async fn capture_screenshot(
        &self,
        session: &mut dyn InteractiveSession,
        path: &Path,
        ctx: &OrderCtx,
    ) -> AppResult<()> {
        let image = session
            .capture_element_image(&self.selectors.preview_image)
            .await?;
        tokio::fs::write(path, &image)
            .await
            .map_err(|e| AppError::file_write_failed(path, e))?;
        info!("{} 📸 截图已保存: {}", ctx, path.display());
        Ok(())
    }

    async fn store_receipt(
        &self,
        session: &mut dyn InteractiveSession,
        path: &Path,
        ctx: &OrderCtx,
    ) -> AppResult<()> {
        let markup = session.read_inner_content(&self.selectors.receipt).await?;
        self.documents.render_to_document(&markup, path).await?;
        info!("{} 🧾 回执已保存: {}", ctx, path.display());
        Ok(())
    }

    /// 站点每次下单后可能重新弹窗
    async fn order_another(
        &self,
        session: &mut dyn InteractiveSession,
        ctx: &OrderCtx,
    ) -> AppResult<()> {
        session.click(&self.selectors.order_another).await?;
        let outcome = dismiss_popup(session, &self.selectors).await;
        debug!("{} 弹窗处理结果: {:?}", ctx, outcome);
        Ok(())
    }
}
