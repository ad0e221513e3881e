//! 单元测试用的会话与文档替身

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::FormSelectors;
use crate::error::{AppError, AppResult, DocumentError};
use crate::infrastructure::InteractiveSession;
use crate::services::{DocumentService, ImageAlignment};

/// 按脚本响应的会话，记录每一次调用
pub struct ScriptedSession {
    selectors: FormSelectors,
    pub calls: Vec<String>,
    /// 每个订单第 N 次点击提交后回执出现；None 表示永不出现
    receipt_after: Option<u32>,
    clicks_this_order: u32,
    pub order_clicks: u32,
    pub popup_visible: bool,
    popup_after_order_another: bool,
    missing: HashSet<String>,
    pub slow_mo: Duration,
}

impl ScriptedSession {
    pub const SCREENSHOT: &'static [u8] = b"\x89PNG-stub";

    pub fn new() -> Self {
        Self {
            selectors: FormSelectors::default(),
            calls: Vec::new(),
            receipt_after: None,
            clicks_this_order: 0,
            order_clicks: 0,
            popup_visible: false,
            popup_after_order_another: false,
            missing: HashSet::new(),
            slow_mo: Duration::ZERO,
        }
    }

    pub fn receipt_after(mut self, clicks: u32) -> Self {
        self.receipt_after = Some(clicks);
        self
    }

    pub fn with_popup(mut self) -> Self {
        self.popup_visible = true;
        self
    }

    pub fn popup_after_order_another(mut self) -> Self {
        self.popup_after_order_another = true;
        self
    }

    pub fn missing(mut self, selector: &str) -> Self {
        self.missing.insert(selector.to_string());
        self
    }

    fn receipt_visible(&self) -> bool {
        matches!(self.receipt_after, Some(n) if self.clicks_this_order >= n)
    }

    fn check(&self, selector: &str) -> AppResult<()> {
        if self.missing.contains(selector) {
            Err(AppError::element_not_found(selector))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl InteractiveSession for ScriptedSession {
    fn set_slow_mo(&mut self, delay: Duration) {
        self.slow_mo = delay;
    }

    async fn navigate(&mut self, url: &str) -> AppResult<()> {
        self.calls.push(format!("navigate {}", url));
        Ok(())
    }

    async fn select_option(&mut self, selector: &str, value: &str) -> AppResult<()> {
        self.calls.push(format!("select {}={}", selector, value));
        self.check(selector)
    }

    async fn click(&mut self, selector: &str) -> AppResult<()> {
        self.calls.push(format!("click {}", selector));
        self.check(selector)?;
        if selector == self.selectors.order {
            self.order_clicks += 1;
            self.clicks_this_order += 1;
        } else if selector == self.selectors.popup_close {
            if !self.popup_visible {
                return Err(AppError::element_not_found(selector));
            }
            self.popup_visible = false;
        } else if selector == self.selectors.order_another {
            self.clicks_this_order = 0;
            self.popup_visible = self.popup_after_order_another;
        }
        Ok(())
    }

    async fn fill(&mut self, selector: &str, text: &str) -> AppResult<()> {
        self.calls.push(format!("fill {}={}", selector, text));
        self.check(selector)
    }

    async fn is_present(&mut self, selector: &str) -> AppResult<bool> {
        self.calls.push(format!("query {}", selector));
        if self.missing.contains(selector) {
            return Ok(false);
        }
        if selector == self.selectors.receipt {
            Ok(self.receipt_visible())
        } else if selector == self.selectors.popup {
            Ok(self.popup_visible)
        } else {
            Ok(true)
        }
    }

    async fn capture_element_image(&mut self, selector: &str) -> AppResult<Vec<u8>> {
        self.calls.push(format!("capture {}", selector));
        self.check(selector)?;
        Ok(Self::SCREENSHOT.to_vec())
    }

    async fn read_inner_content(&mut self, selector: &str) -> AppResult<String> {
        self.calls.push(format!("read {}", selector));
        self.check(selector)?;
        Ok("<h3>Receipt</h3><p>Thank you!</p>".to_string())
    }
}

/// 记录调用的文档服务：渲染时写出 markup，合并时只记录
#[derive(Default)]
pub struct RecordingDocuments {
    fail_render: bool,
    renders: Mutex<Vec<PathBuf>>,
    merges: Mutex<Vec<(PathBuf, PathBuf, ImageAlignment)>>,
}

impl RecordingDocuments {
    pub fn failing_render() -> Self {
        Self {
            fail_render: true,
            ..Self::default()
        }
    }

    pub fn renders(&self) -> Vec<PathBuf> {
        self.renders.lock().unwrap().clone()
    }

    pub fn merges(&self) -> Vec<(PathBuf, PathBuf, ImageAlignment)> {
        self.merges.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentService for RecordingDocuments {
    async fn render_to_document(&self, markup: &str, destination: &Path) -> AppResult<()> {
        if self.fail_render {
            return Err(DocumentError::RenderFailed {
                path: destination.display().to_string(),
                source: "renderer offline".into(),
            }
            .into());
        }
        std::fs::write(destination, markup).map_err(|e| AppError::file_write_failed(destination, e))?;
        self.renders.lock().unwrap().push(destination.to_path_buf());
        Ok(())
    }

    async fn merge_image_into(
        &self,
        document: &Path,
        image: &Path,
        alignment: ImageAlignment,
    ) -> AppResult<()> {
        self.merges
            .lock()
            .unwrap()
            .push((document.to_path_buf(), image.to_path_buf(), alignment));
        Ok(())
    }
}
