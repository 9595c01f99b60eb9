//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, warn};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// Text-layer extractor for manifest PDFs.
///
/// Scanned manifests without a text layer come back as empty pages; those
/// need an external OCR step.
pub struct PdfTextExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfTextExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Load a PDF from bytes in one step.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut extractor = Self::new();
        extractor.load(data)?;
        Ok(extractor)
    }

    /// Whether any page carries extractable text.
    pub fn has_text_layer(&self) -> bool {
        self.extract_pages()
            .map(|pages| pages.iter().any(|p| !p.trim().is_empty()))
            .unwrap_or(false)
    }

    fn loaded_data(&self) -> Result<&[u8]> {
        if self.document.is_none() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }
        Ok(&self.raw_data)
    }
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfTextExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Report exports are often "encrypted" with an empty user password
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_pages(&self) -> Result<Vec<String>> {
        let data = self.loaded_data()?;

        match pdf_extract::extract_text_from_mem_by_pages(data) {
            Ok(pages) => {
                debug!("Extracted text from {} pages", pages.len());
                Ok(pages)
            }
            Err(e) => {
                warn!("Per-page extraction failed ({}), falling back to whole document", e);
                let text = pdf_extract::extract_text_from_mem(data)
                    .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
                Ok(vec![text])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfTextExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
        assert!(!extractor.has_text_layer());
    }

    #[test]
    fn test_extract_without_document() {
        let extractor = PdfTextExtractor::new();
        assert!(matches!(extractor.extract_pages(), Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_load_rejects_garbage() {
        let result = PdfTextExtractor::from_bytes(b"not a pdf");
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }
}
