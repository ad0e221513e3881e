pub mod archive_service;
pub mod cleanup;
pub mod document_service;
pub mod order_source;
pub mod popup_service;

pub use archive_service::{ArchiveService, ZipArchiveService};
pub use cleanup::clear_directory;
pub use document_service::{append_image_page, DocumentService, ImageAlignment, PdfDocumentService};
pub use order_source::{HttpCsvOrderSource, OrderSource, StaticOrderSource};
pub use popup_service::{dismiss_popup, PopupOutcome};
