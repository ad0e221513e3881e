//! 文档服务 - 业务能力层
//!
//! - 回执 HTML → PDF：借用浏览器的打印能力，在单独的渲染标签页中完成
//! - 截图 → PDF：用 lopdf 在原文件末尾追加一页并放置图片（原地修改）

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::Page;
use lopdf::{dictionary, Document, Object, Stream};
use tracing::{debug, info};

use crate::error::{AppError, AppResult, DocumentError};

/// A4，单位 pt
const DEFAULT_PAGE_SIZE: (f32, f32) = (595.0, 842.0);
const PAGE_MARGIN: f32 = 36.0;
/// 截图按 96 DPI 换算为 pt
const PX_TO_PT: f32 = 0.75;

/// 图片在新页面中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageAlignment {
    #[default]
    Center,
    TopLeft,
}

#[async_trait]
pub trait DocumentService: Send + Sync {
    /// 把 HTML 片段渲染为新的 PDF 文件
    async fn render_to_document(&self, markup: &str, destination: &Path) -> AppResult<()>;

    /// 把图片合并进已有的 PDF（原地修改）
    async fn merge_image_into(
        &self,
        document: &Path,
        image: &Path,
        alignment: ImageAlignment,
    ) -> AppResult<()>;
}

/// 浏览器渲染 + lopdf 合并
pub struct PdfDocumentService {
    render_page: Page,
}

impl PdfDocumentService {
    /// `render_page` 必须是独立于下单页面的标签页
    pub fn new(render_page: Page) -> Self {
        Self { render_page }
    }
}

#[async_trait]
impl DocumentService for PdfDocumentService {
    async fn render_to_document(&self, markup: &str, destination: &Path) -> AppResult<()> {
        let render_failed = |e: chromiumoxide::error::CdpError| {
            AppError::Document(DocumentError::RenderFailed {
                path: destination.display().to_string(),
                source: Box::new(e),
            })
        };

        self.render_page
            .set_content(wrap_markup(markup))
            .await
            .map_err(render_failed)?;

        let params = PrintToPdfParams {
            print_background: Some(true),
            ..Default::default()
        };
        let pdf = self.render_page.pdf(params).await.map_err(render_failed)?;

        tokio::fs::write(destination, &pdf)
            .await
            .map_err(|e| AppError::file_write_failed(destination, e))?;

        debug!("回执PDF已生成: {} ({} 字节)", destination.display(), pdf.len());
        Ok(())
    }

    async fn merge_image_into(
        &self,
        document: &Path,
        image: &Path,
        alignment: ImageAlignment,
    ) -> AppResult<()> {
        let document = document.to_path_buf();
        let image = image.to_path_buf();
        tokio::task::spawn_blocking(move || append_image_page(&document, &image, alignment))
            .await?
    }
}

fn wrap_markup(markup: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head><body>{}</body></html>",
        markup
    )
}

/// 在 PDF 末尾追加一页，把图片等比缩放后放入
///
/// 新页尺寸与第一页一致（取不到则用 A4）。
pub fn append_image_page(
    document_path: &Path,
    image_path: &Path,
    alignment: ImageAlignment,
) -> AppResult<()> {
    let merge_failed = |source: lopdf::Error| DocumentError::MergeFailed {
        path: document_path.display().to_string(),
        source,
    };

    let image_bytes =
        std::fs::read(image_path).map_err(|e| AppError::file_read_failed(image_path, e))?;
    let (image_stream, img_w, img_h) =
        rgb_image_xobject(&image_bytes).map_err(|e| DocumentError::InvalidImage {
            path: image_path.display().to_string(),
            reason: e.to_string(),
        })?;

    let mut doc = Document::load(document_path).map_err(merge_failed)?;
    let page_size = first_page_size(&doc).unwrap_or(DEFAULT_PAGE_SIZE);

    let pages_id = pages_root(&doc).map_err(merge_failed)?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), page_size.0.into(), page_size.1.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {},
    });

    {
        let pages = doc
            .get_object_mut(pages_id)
            .and_then(Object::as_dict_mut)
            .map_err(merge_failed)?;
        let count = pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        pages
            .get_mut(b"Kids")
            .and_then(Object::as_array_mut)
            .map_err(merge_failed)?
            .push(page_id.into());
        pages.set("Count", count + 1);
    }

    let (position, size) = place_image(page_size, (img_w, img_h), alignment);
    doc.insert_image(page_id, image_stream, position, size)
        .map_err(merge_failed)?;

    doc.save(document_path)
        .map_err(|e| DocumentError::SaveFailed {
            path: document_path.display().to_string(),
            reason: e.to_string(),
        })?;

    info!(
        "🖼️ 已将 {} 嵌入 {}",
        file_name(image_path),
        file_name(document_path)
    );
    Ok(())
}

/// 计算图片左下角坐标和绘制尺寸（PDF 坐标原点在左下）
fn place_image(
    page_size: (f32, f32),
    image_px: (f32, f32),
    alignment: ImageAlignment,
) -> ((f32, f32), (f32, f32)) {
    let (page_w, page_h) = page_size;
    let max_w = (page_w - 2.0 * PAGE_MARGIN).max(1.0);
    let max_h = (page_h - 2.0 * PAGE_MARGIN).max(1.0);

    let natural_w = image_px.0 * PX_TO_PT;
    let natural_h = image_px.1 * PX_TO_PT;
    let scale = (max_w / natural_w).min(max_h / natural_h).min(1.0);
    let (w, h) = (natural_w * scale, natural_h * scale);

    let position = match alignment {
        ImageAlignment::Center => ((page_w - w) / 2.0, (page_h - h) / 2.0),
        ImageAlignment::TopLeft => (PAGE_MARGIN, page_h - PAGE_MARGIN - h),
    };
    (position, (w, h))
}

/// 解码截图并生成 8 位 DeviceRGB 图片对象，返回 (stream, 宽, 高)
///
/// 浏览器截图带 alpha 通道，透明像素先与白色背景合成。
fn rgb_image_xobject(bytes: &[u8]) -> image::ImageResult<(Stream, f32, f32)> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        rgb.extend([r, g, b].map(|c| blend_on_white(c, a)));
    }

    let mut stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        rgb,
    );
    // 压缩失败时保留原始数据，仍然是合法的图片对象
    let _ = stream.compress();

    Ok((stream, width as f32, height as f32))
}

fn blend_on_white(channel: u8, alpha: u8) -> u8 {
    let (c, a) = (u32::from(channel), u32::from(alpha));
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}

fn pages_root(doc: &Document) -> lopdf::Result<lopdf::ObjectId> {
    let root_id = doc.trailer.get(b"Root")?.as_reference()?;
    doc.get_object(root_id)?
        .as_dict()?
        .get(b"Pages")?
        .as_reference()
}

/// 第一页的 MediaBox，页面自身没有时向上查找 Pages 节点
fn first_page_size(doc: &Document) -> Option<(f32, f32)> {
    let page_id = *doc.get_pages().values().next()?;
    let mut node = doc.get_object(page_id).ok()?.as_dict().ok()?;

    loop {
        if let Ok(media_box) = node.get(b"MediaBox").and_then(Object::as_array) {
            let values: Vec<f32> = media_box
                .iter()
                .filter_map(|v| v.as_float().ok())
                .collect();
            if let &[x0, y0, x1, y1] = values.as_slice() {
                return Some((x1 - x0, y1 - y0));
            }
            return None;
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_object(parent).ok()?.as_dict().ok()?;
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// 测试与离线场景下用 lopdf 生成一页空白 PDF
pub fn write_blank_pdf(path: &Path) -> AppResult<PathBuf> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).map_err(|e| DocumentError::SaveFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(path.to_path_buf())
}
