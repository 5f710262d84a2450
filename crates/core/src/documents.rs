//! Text-to-document generators and PDF text extraction.
//!
//! PDF output is a small but well-formed PDF 1.4 file: Helvetica, one text
//! line per source line, wrapped and paginated on US Letter.
//!
//! DOCX and XLSX outputs are low-fidelity stubs. The source text is carried
//! unchanged and only the MIME label changes, so a consumer opening them with
//! an office suite will not get a real package.

use crate::formats::TargetFormat;
use crate::item::ConvertedOutput;

/// Returned when a PDF carries no extractable literal text.
pub const PDF_TEXT_PLACEHOLDER: &str = "[Extracted Text from PDF placeholder]";

const PAGE_WIDTH: u32 = 612;
const PAGE_HEIGHT: u32 = 792;
const MARGIN: u32 = 56;
const FONT_SIZE: u32 = 11;
const LEADING: u32 = 14;
const WRAP_COLUMNS: usize = 90;
const LINES_PER_PAGE: usize = ((PAGE_HEIGHT - 2 * MARGIN) / LEADING) as usize;

/// Convert text content into `target`.
pub fn text_to_document(text: &str, target: TargetFormat) -> ConvertedOutput {
    match target {
        TargetFormat::Pdf => ConvertedOutput::new(render_pdf(text), TargetFormat::Pdf),
        // Docx, Xlsx and plain re-labels all carry the text as-is.
        other => ConvertedOutput::new(text.as_bytes().to_vec(), other),
    }
}

/// Render text into a paginated PDF document.
pub fn render_pdf(text: &str) -> Vec<u8> {
    let lines = wrap_lines(text);
    let no_lines: &[String] = &[];
    let pages: Vec<&[String]> = if lines.is_empty() {
        vec![no_lines]
    } else {
        lines.chunks(LINES_PER_PAGE).collect()
    };

    let mut pdf = PdfWriter::new();

    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", page_object_id(i)))
        .collect();

    pdf.object("<< /Type /Catalog /Pages 2 0 R >>");
    pdf.object(&format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        pages.len()
    ));
    pdf.object("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>");

    for (index, page_lines) in pages.iter().enumerate() {
        pdf.object(&format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            PAGE_WIDTH,
            PAGE_HEIGHT,
            page_object_id(index) + 1
        ));

        let content = page_content(page_lines);
        pdf.object(&format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ));
    }

    pdf.finish()
}

/// Extract literal text shown with `Tj` / `'` operators.
///
/// Compressed content streams are not inflated, so documents produced by
/// most authoring tools yield [`PDF_TEXT_PLACEHOLDER`].
pub fn extract_pdf_text(data: &[u8]) -> String {
    let source = String::from_utf8_lossy(data);
    let mut chars = source.chars().peekable();
    let mut lines = Vec::new();

    while let Some(c) = chars.next() {
        if c != '(' {
            continue;
        }

        let mut literal = String::new();
        let mut depth = 1;
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some('n') => literal.push('\n'),
                    Some('t') => literal.push('\t'),
                    Some(escaped) => literal.push(escaped),
                    None => break,
                },
                '(' => {
                    depth += 1;
                    literal.push(c);
                }
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    literal.push(c);
                }
                _ => literal.push(c),
            }
        }

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let shown = match chars.peek() {
            Some('\'') => true,
            Some('T') => {
                chars.next();
                chars.peek() == Some(&'j')
            }
            _ => false,
        };
        if shown {
            lines.push(literal);
        }
    }

    if lines.is_empty() {
        PDF_TEXT_PLACEHOLDER.to_string()
    } else {
        lines.join("\n")
    }
}

fn page_object_id(page_index: usize) -> usize {
    4 + page_index * 2
}

fn page_content(lines: &[String]) -> String {
    let mut content = format!(
        "BT\n/F1 {} Tf\n{} TL\n{} {} Td",
        FONT_SIZE,
        LEADING,
        MARGIN,
        PAGE_HEIGHT - MARGIN
    );
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            content.push_str("\nT*");
        }
        content.push_str(&format!("\n({}) Tj", escape_literal(line)));
    }
    content.push_str("\nET");
    content
}

fn wrap_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        let expanded = raw.replace('\t', "    ");
        let chars: Vec<char> = expanded.chars().collect();
        if chars.is_empty() {
            lines.push(String::new());
            continue;
        }
        for chunk in chars.chunks(WRAP_COLUMNS) {
            lines.push(chunk.iter().collect());
        }
    }
    lines
}

fn escape_literal(line: &str) -> String {
    let mut escaped = String::with_capacity(line.len());
    for c in line.chars() {
        match c {
            '\\' | '(' | ')' => {
                escaped.push('\\');
                escaped.push(c);
            }
            ' '..='~' => escaped.push(c),
            _ => escaped.push('?'),
        }
    }
    escaped
}

/// Sequential object writer that tracks offsets for the xref table.
struct PdfWriter {
    out: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut out = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            out,
            offsets: Vec::new(),
        }
    }

    fn object(&mut self, body: &str) {
        self.offsets.push(self.out.len());
        let header = format!("{} 0 obj\n", self.offsets.len());
        self.out.extend_from_slice(header.as_bytes());
        self.out.extend_from_slice(body.as_bytes());
        self.out.extend_from_slice(b"\nendobj\n");
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_offset = self.out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", self.offsets.len() + 1);
        for offset in &self.offsets {
            xref.push_str(&format!("{:010} 00000 n \n", offset));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            self.offsets.len() + 1,
            xref_offset
        ));
        self.out.extend_from_slice(xref.as_bytes());
        self.out
    }
}
