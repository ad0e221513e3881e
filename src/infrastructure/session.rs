//! 交互会话能力接口
//!
//! 工作流只依赖这里的能力集合，不直接接触浏览器。
//! 所有方法都取 `&mut self`：同一时刻只能有一个订单在使用会话。

use std::time::Duration;

use async_trait::async_trait;

use crate::error::AppResult;

#[async_trait]
pub trait InteractiveSession: Send {
    /// 每次交互前的延迟（用于动画较多、响应慢的站点）
    fn set_slow_mo(&mut self, delay: Duration);

    async fn navigate(&mut self, url: &str) -> AppResult<()>;

    async fn select_option(&mut self, selector: &str, value: &str) -> AppResult<()>;

    async fn click(&mut self, selector: &str) -> AppResult<()>;

    async fn fill(&mut self, selector: &str, text: &str) -> AppResult<()>;

    /// 元素当前是否存在；不存在不是错误
    async fn is_present(&mut self, selector: &str) -> AppResult<bool>;

    /// 元素渲染后的 PNG 字节
    async fn capture_element_image(&mut self, selector: &str) -> AppResult<Vec<u8>>;

    /// 元素的 innerHTML
    async fn read_inner_content(&mut self, selector: &str) -> AppResult<String>;
}
