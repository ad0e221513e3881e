//! 基于 chromiumoxide 的交互会话

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::element::Element;
use tokio::time::sleep;
use tracing::debug;

use crate::error::{AppError, AppResult, BrowserError};
use crate::infrastructure::js_executor::{js_string, JsExecutor};
use crate::infrastructure::session::InteractiveSession;

/// 浏览器会话
///
/// 持有 JsExecutor（即唯一的下单页面）。表单赋值走 JS，
/// 点击和截图走 CDP 元素句柄。
pub struct ChromiumSession {
    executor: JsExecutor,
    slow_mo: Duration,
}

impl ChromiumSession {
    pub fn new(executor: JsExecutor) -> Self {
        Self {
            executor,
            slow_mo: Duration::ZERO,
        }
    }

    async fn pace(&self) {
        if !self.slow_mo.is_zero() {
            sleep(self.slow_mo).await;
        }
    }

    async fn find(&self, selector: &str) -> AppResult<Element> {
        self.executor
            .page()
            .find_element(selector)
            .await
            .map_err(|_| AppError::element_not_found(selector))
    }

    /// 用原生 setter 赋值并派发 input/change 事件，
    /// 否则 React 受控组件感知不到变化
    async fn set_value(&self, selector: &str, value: &str) -> AppResult<()> {
        let js_code = format!(
            r#"
            (() => {{
                const el = document.querySelector({selector});
                if (!el) return false;
                const proto = Object.getPrototypeOf(el);
                const setter = Object.getOwnPropertyDescriptor(proto, 'value').set;
                setter.call(el, {value});
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()
            "#,
            selector = js_string(selector),
            value = js_string(value),
        );

        let found: bool = self.executor.eval_as(js_code).await?;
        if found {
            Ok(())
        } else {
            Err(AppError::element_not_found(selector))
        }
    }
}

#[async_trait]
impl InteractiveSession for ChromiumSession {
    fn set_slow_mo(&mut self, delay: Duration) {
        self.slow_mo = delay;
    }

    async fn navigate(&mut self, url: &str) -> AppResult<()> {
        self.pace().await;
        debug!("导航到: {}", url);
        self.executor.page().goto(url).await.map_err(|e| {
            AppError::Browser(BrowserError::NavigationFailed {
                url: url.to_string(),
                source: Box::new(e),
            })
        })?;
        Ok(())
    }

    async fn select_option(&mut self, selector: &str, value: &str) -> AppResult<()> {
        self.pace().await;
        debug!("选择 {} = {}", selector, value);
        self.set_value(selector, value).await
    }

    async fn click(&mut self, selector: &str) -> AppResult<()> {
        self.pace().await;
        debug!("点击 {}", selector);
        let element = self.find(selector).await?;
        element
            .click()
            .await
            .map_err(|e| AppError::interaction_failed("点击", selector, e))?;
        Ok(())
    }

    async fn fill(&mut self, selector: &str, text: &str) -> AppResult<()> {
        self.pace().await;
        debug!("填写 {} = {}", selector, text);
        self.set_value(selector, text).await
    }

    async fn is_present(&mut self, selector: &str) -> AppResult<bool> {
        let js_code = format!("document.querySelector({}) !== null", js_string(selector));
        self.executor.eval_as(js_code).await
    }

    async fn capture_element_image(&mut self, selector: &str) -> AppResult<Vec<u8>> {
        self.pace().await;
        let element = self.find(selector).await?;
        element
            .screenshot(CaptureScreenshotFormat::Png)
            .await
            .map_err(|e| AppError::interaction_failed("截图", selector, e))
    }

    async fn read_inner_content(&mut self, selector: &str) -> AppResult<String> {
        let element = self.find(selector).await?;
        element
            .inner_html()
            .await
            .map_err(|e| AppError::interaction_failed("读取", selector, e))?
            .ok_or_else(|| AppError::element_not_found(selector))
    }
}
