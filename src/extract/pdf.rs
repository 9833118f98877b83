use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use super::ExtractionError;

/// Text of every page, in page order. Page breaks become newlines.
pub fn extract(path: &Path) -> Result<String, ExtractionError> {
    let fail = |reason: String| ExtractionError::Pdf {
        path: path.to_path_buf(),
        reason,
    };

    let data = std::fs::read(path).map_err(|source| ExtractionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if !data.starts_with(b"%PDF") {
        return Err(fail("missing %PDF header".into()));
    }

    // pdf-extract panics on some malformed font tables instead of erroring.
    let pages = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(&data)
    }))
    .map_err(|_| fail("parser panicked".into()))?
    .map_err(|e| fail(e.to_string()))?;

    Ok(join_pages(&pages))
}

/// The whole-document extractor runs pages together when two pages put text
/// at the same position, so pages are extracted one by one and joined here.
fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|page| page.replace('\x0C', "\n"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Minimal PDF with one Helvetica text line per page and a correct xref.
    fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let font_id = 3 + 2 * pages.len();
        let kids: Vec<String> = (0..pages.len()).map(|i| format!("{} 0 R", 3 + 2 * i)).collect();

        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                pages.len()
            ),
        ];
        for (i, text) in pages.iter().enumerate() {
            let content = format!("BT /F1 24 Tf 72 700 Td ({text}) Tj ET");
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 {font_id} 0 R >> >> /Contents {} 0 R >>",
                4 + 2 * i
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{content}\nendstream",
                content.len()
            ));
        }
        objects.push(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        );

        let mut out = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
        }
        let xref_at = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets {
            out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
                objects.len() + 1
            )
            .as_bytes(),
        );
        out
    }

    fn write_pdf(dir: &TempDir, name: &str, pages: &[&str]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, build_pdf(pages)).unwrap();
        path
    }

    #[test]
    fn extracts_single_page_text() {
        let dir = TempDir::new().unwrap();
        let path = write_pdf(&dir, "essay.pdf", &["Photosynthesis"]);
        let text = extract(&path).unwrap();
        assert!(text.contains("Photosynthesis"), "got {text:?}");
    }

    #[test]
    fn pages_come_out_in_order_without_form_feeds() {
        let dir = TempDir::new().unwrap();
        let path = write_pdf(&dir, "two.pdf", &["Chlorophyll", "Mitochondria"]);
        let text = extract(&path).unwrap();
        let first = text.find("Chlorophyll").expect("first page text");
        let second = text.find("Mitochondria").expect("second page text");
        assert!(first < second);
        assert!(!text.contains('\x0C'));
        assert!(text[first..second].contains('\n'));
    }

    #[test]
    fn pages_are_joined_with_newlines() {
        let pages = vec!["one".to_string(), "two\x0C".to_string(), "three".to_string()];
        assert_eq!(join_pages(&pages), "one\ntwo\n\nthree");
    }

    #[test]
    fn rejects_non_pdf_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"just some text").unwrap();
        let err = extract(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::Pdf { ref reason, .. } if reason.contains("%PDF")));
    }

    #[test]
    fn truncated_pdf_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.4\n1 0 obj\n<<").unwrap();
        assert!(matches!(extract(&path), Err(ExtractionError::Pdf { .. })));
    }
}
