use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use crate::error::{AppError, AppResult, SourceError};
use crate::models::order::OrderRecord;

/// 订单号会直接作为文件名使用，只允许安全字符
fn order_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("静态正则表达式"))
}

/// 从任意 reader 解析订单 CSV
///
/// 表头：`Order number,Head,Body,Legs,Address`
pub fn parse_orders<R: Read>(reader: R) -> AppResult<Vec<OrderRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut orders = Vec::new();
    let mut seen = HashSet::new();

    for (idx, row) in csv_reader.deserialize::<OrderRecord>().enumerate() {
        // 第 1 行是表头
        let row_number = idx + 2;
        let record = row.map_err(SourceError::CsvParseFailed)?;
        validate_order_number(&record.order_number, row_number)?;

        if !seen.insert(record.order_number.clone()) {
            return Err(SourceError::DuplicateOrderNumber {
                order_number: record.order_number,
            }
            .into());
        }

        debug!("解析订单 {}: head={} body={}", record.order_number, record.head, record.body);
        orders.push(record);
    }

    Ok(orders)
}

/// 从本地 CSV 文件加载订单
pub async fn load_orders_csv(path: &Path) -> AppResult<Vec<OrderRecord>> {
    let content = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::file_read_failed(path, e))?;
    let orders = parse_orders(content.as_slice())?;
    info!("成功加载 {} 个订单: {}", orders.len(), path.display());
    Ok(orders)
}

fn validate_order_number(order_number: &str, row: usize) -> AppResult<()> {
    let reason = if order_number.is_empty() {
        "订单号为空"
    } else if order_number == "." || order_number == ".." {
        "订单号不能是 . 或 .."
    } else if !order_number_pattern().is_match(order_number) {
        "订单号只能包含字母、数字、点、下划线和连字符"
    } else {
        return Ok(());
    };

    Err(SourceError::InvalidRecord {
        row,
        reason: format!("{} ({:?})", reason, order_number),
    }
    .into())
}
