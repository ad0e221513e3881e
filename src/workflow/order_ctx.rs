//! 订单处理上下文
//!
//! 封装"我正在处理第几个订单、订单号是多少"这一信息

use std::fmt::{self, Display};

/// 单个订单的处理阶段，按执行顺序排列
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OrderStage {
    Fill,
    Submit,
    Screenshot,
    Receipt,
    Embed,
    Advance,
}

impl Display for OrderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStage::Fill => "填写表单",
            OrderStage::Submit => "提交订单",
            OrderStage::Screenshot => "保存截图",
            OrderStage::Receipt => "生成回执",
            OrderStage::Embed => "嵌入截图",
            OrderStage::Advance => "继续下单",
        };
        f.write_str(name)
    }
}

/// 订单处理上下文
#[derive(Debug, Clone)]
pub struct OrderCtx {
    /// 订单号
    pub order_number: String,

    /// 在批次中的序号（从1开始，仅用于日志显示）
    pub order_index: usize,

    /// 批次订单总数
    pub total_orders: usize,
}

impl OrderCtx {
    pub fn new(order_number: String, order_index: usize, total_orders: usize) -> Self {
        Self {
            order_number,
            order_index,
            total_orders,
        }
    }
}

impl Display for OrderCtx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[订单 #{} {}/{}]",
            self.order_number, self.order_index, self.total_orders
        )
    }
}
