//! # Robot Order
//!
//! 自动在机器人商店网页上批量下单，并把每个订单的回执和截图归档
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `InteractiveSession` - 页面交互能力（导航、选择、点击、填写、截图）
//! - `ChromiumSession` - 基于 `JsExecutor` 的 chromiumoxide 实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `OrderSource` - 下载并解析订单 CSV
//! - `DocumentService` - 回执 HTML → PDF，截图嵌入 PDF
//! - `ArchiveService` - 回执目录 → ZIP
//! - `dismiss_popup` / `clear_directory` - 弹窗与目录清理
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个订单"的完整处理流程
//! - `OrderCtx` - 上下文封装（order_number + order_index）
//! - `OrderFlow` - 流程编排（fill → submit → screenshot → receipt → embed → next）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量订单处理器，管理资源、归档与清理
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{connect_to_browser, launch_browser};
pub use config::{Config, FormSelectors};
pub use error::{AppError, AppResult};
pub use infrastructure::{ChromiumSession, InteractiveSession, JsExecutor};
pub use models::{ArtifactSet, OrderRecord, OutputLayout};
pub use orchestrator::{App, BatchProcessor, RunReport};
pub use workflow::{OrderCtx, OrderFlow, OrderStage, RetryPolicy};
