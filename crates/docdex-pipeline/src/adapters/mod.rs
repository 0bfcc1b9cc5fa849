//! Extraction adapter implementations.

pub mod image_ocr;
pub mod pdf_text;

pub use image_ocr::ImageOcrAdapter;
pub use pdf_text::PdfTextAdapter;
