/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::path::Path;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化 tracing 订阅者
///
/// 默认 `info`（`verbose` 时为 `debug`），可通过 `RUST_LOG` 覆盖。重复调用无副作用。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 机器人订单处理");
    info!("🌐 下单页面: {}", config.target_url);
    info!("📁 输出目录: {}", config.output_dir);
    info!(
        "🔁 提交重试: 最多 {} 次, 间隔 {}ms",
        config.submit_max_attempts, config.submit_backoff_ms
    );
    info!("{}", "=".repeat(60));
}

/// 记录订单加载信息
pub fn log_orders_loaded(total: usize) {
    info!("✓ 找到 {} 个待处理的订单", total);
    info!("💡 订单将逐个顺序处理，任何订单失败都会终止整个批次\n");
}

/// 记录订单开始
pub fn log_order_start(order_index: usize, total: usize, order_number: &str) {
    info!("\n{}", "─".repeat(60));
    info!("📦 处理第 {}/{} 个订单 (订单号: {})", order_index, total, order_number);
}

/// 打印最终统计信息
pub fn print_final_stats(processed: usize, archive_path: Option<&Path>, elapsed: Duration) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 完成订单: {}", processed);
    match archive_path {
        Some(path) => info!("📦 回执归档: {}", path.display()),
        None => info!("📦 未生成归档"),
    }
    info!("⏱️ 耗时: {:.1}s", elapsed.as_secs_f64());
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
