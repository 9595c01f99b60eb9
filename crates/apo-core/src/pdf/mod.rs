//! PDF text-layer extraction for manifest files.

mod extractor;

pub use extractor::PdfTextExtractor;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF text extraction implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract the text of every page, in page order.
    fn extract_pages(&self) -> Result<Vec<String>>;

    /// Extract text from a specific page (1-indexed).
    fn extract_page_text(&self, page: u32) -> Result<String> {
        if page == 0 || page > self.page_count() {
            return Err(PdfError::InvalidPage(page));
        }
        let mut pages = self.extract_pages()?;
        let index = (page - 1) as usize;
        if index >= pages.len() {
            return Err(PdfError::InvalidPage(page));
        }
        Ok(pages.swap_remove(index))
    }

    /// Extract the whole document as manifest text.
    fn extract_manifest_text(&self) -> Result<String> {
        Ok(join_pages(&self.extract_pages()?))
    }
}

/// Join page texts with `--- Seite N ---` markers between pages.
///
/// The manifest normalizer drops the markers again, so stops split across a
/// page boundary still parse as one record.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let mut text = String::new();
    for (index, page) in pages.iter().enumerate() {
        if index > 0 {
            text.push_str(&format!("\n\n--- Seite {} ---\n\n", index + 1));
        }
        text.push_str(page.as_ref().trim_end());
    }
    text
}
