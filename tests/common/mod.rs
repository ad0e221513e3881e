//! 集成测试共用的会话与文档替身

use std::io::Cursor;
use std::path::Path;

use async_trait::async_trait;
use image::{ImageBuffer, ImageFormat, Rgba};

use robot_order::error::{AppError, AppResult};
use robot_order::services::document_service::{append_image_page, write_blank_pdf};
use robot_order::services::{DocumentService, ImageAlignment};
use robot_order::{FormSelectors, InteractiveSession};

/// 模拟下单页面：提交第 `receipt_after` 次后出现回执，截图返回真实 PNG
pub struct FakeStore {
    selectors: FormSelectors,
    receipt_after: u32,
    clicks_this_order: u32,
    missing: Vec<String>,
    pub navigated: Vec<String>,
    pub orders_submitted: u32,
}

impl FakeStore {
    pub fn new(receipt_after: u32) -> Self {
        Self {
            selectors: FormSelectors::default(),
            receipt_after,
            clicks_this_order: 0,
            missing: Vec::new(),
            navigated: Vec::new(),
            orders_submitted: 0,
        }
    }

    pub fn missing(mut self, selector: &str) -> Self {
        self.missing.push(selector.to_string());
        self
    }

    fn check(&self, selector: &str) -> AppResult<()> {
        if self.missing.iter().any(|m| m == selector) {
            Err(AppError::element_not_found(selector))
        } else {
            Ok(())
        }
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    // 浏览器的元素截图是 RGBA
    let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, if x % 2 == 0 { 255 } else { 0 }])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

#[async_trait]
impl InteractiveSession for FakeStore {
    fn set_slow_mo(&mut self, _delay: std::time::Duration) {}

    async fn navigate(&mut self, url: &str) -> AppResult<()> {
        self.navigated.push(url.to_string());
        Ok(())
    }

    async fn select_option(&mut self, selector: &str, _value: &str) -> AppResult<()> {
        self.check(selector)
    }

    async fn click(&mut self, selector: &str) -> AppResult<()> {
        self.check(selector)?;
        if selector == self.selectors.order {
            self.clicks_this_order += 1;
            if self.clicks_this_order == self.receipt_after {
                self.orders_submitted += 1;
            }
        } else if selector == self.selectors.order_another {
            self.clicks_this_order = 0;
        } else if selector == self.selectors.popup_close {
            return Err(AppError::element_not_found(selector));
        }
        Ok(())
    }

    async fn fill(&mut self, selector: &str, _text: &str) -> AppResult<()> {
        self.check(selector)
    }

    async fn is_present(&mut self, selector: &str) -> AppResult<bool> {
        if selector == self.selectors.receipt {
            Ok(self.clicks_this_order >= self.receipt_after)
        } else if selector == self.selectors.popup {
            Ok(false)
        } else {
            Ok(!self.missing.iter().any(|m| m == selector))
        }
    }

    async fn capture_element_image(&mut self, selector: &str) -> AppResult<Vec<u8>> {
        self.check(selector)?;
        Ok(png_bytes(40, 60))
    }

    async fn read_inner_content(&mut self, selector: &str) -> AppResult<String> {
        self.check(selector)?;
        Ok("<h3>Receipt</h3>".to_string())
    }
}

/// 渲染写出一页空白 PDF，合并使用真实的 lopdf 实现
pub struct OfflineDocuments;

#[async_trait]
impl DocumentService for OfflineDocuments {
    async fn render_to_document(&self, _markup: &str, destination: &Path) -> AppResult<()> {
        write_blank_pdf(destination)?;
        Ok(())
    }

    async fn merge_image_into(
        &self,
        document: &Path,
        image: &Path,
        alignment: ImageAlignment,
    ) -> AppResult<()> {
        append_image_page(document, image, alignment)
    }
}
