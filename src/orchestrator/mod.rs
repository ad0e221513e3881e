//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整批订单的调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量订单处理器
//! - 管理应用生命周期（初始化、运行、归档、清理）
//! - 一次性加载订单（Vec<OrderRecord>）
//! - 管理浏览器资源（Browser、ChromiumSession、渲染页）
//! - 输出全局统计信息
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<OrderRecord>)
//!     ↓
//! workflow::OrderFlow (处理单个订单)
//!     ↓
//! services (能力层：order source / document / archive / popup)
//!     ↓
//! infrastructure (基础设施：InteractiveSession)
//! ```
//!
//! ## 设计原则
//!
//! 1. **资源隔离**：只有编排层持有 Browser 和会话
//! 2. **向下依赖**：编排层 → workflow → services → infrastructure
//! 3. **失败即停**：任一订单失败立即终止，不归档也不清理

pub mod batch_processor;

// 重新导出主要类型
pub use batch_processor::{App, BatchProcessor, RunReport};
