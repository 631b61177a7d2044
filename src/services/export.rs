use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::SummaryResult;

// A4 in points.
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN_X: f32 = 28.0;
const MARGIN_TOP: f32 = 57.0;
const MARGIN_BOTTOM: f32 = 57.0;

const TITLE_COLUMNS: usize = 55;
const SOURCE_COLUMNS: usize = 105;
const BODY_COLUMNS: usize = 85;

/// Plain-text export is the summary exactly as generated.
pub fn to_text(result: &SummaryResult) -> String {
    result.summary.clone()
}

/// `My Video Title` becomes `My_Video_Title_summary`.
pub fn file_stem(result: &SummaryResult) -> String {
    let title: String = result
        .video_title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '-' } else { c })
        .collect();
    format!("{title}_summary")
}

pub fn write_text(dir: &Path, result: &SummaryResult) -> Result<PathBuf> {
    let path = dir.join(format!("{}.txt", file_stem(result)));
    std::fs::create_dir_all(dir)?;
    std::fs::write(&path, to_text(result))?;
    tracing::info!("Exported summary text to {}", path.display());
    Ok(path)
}

pub fn write_pdf(dir: &Path, result: &SummaryResult) -> Result<PathBuf> {
    let path = dir.join(format!("{}.pdf", file_stem(result)));
    std::fs::create_dir_all(dir)?;
    std::fs::write(&path, to_pdf(result))?;
    tracing::info!("Exported summary PDF to {}", path.display());
    Ok(path)
}

struct TextLine {
    text: String,
    size: f32,
    gray: f32,
    leading: f32,
}

fn wrapped(text: &str, columns: usize, size: f32, gray: f32, leading: f32) -> Vec<TextLine> {
    textwrap::wrap(text, columns)
        .into_iter()
        .map(|line| TextLine {
            text: line.into_owned(),
            size,
            gray,
            leading,
        })
        .collect()
}

/// Title, source link and wrapped body, flowing onto new pages as needed.
pub fn to_pdf(result: &SummaryResult) -> Vec<u8> {
    let mut lines = wrapped(&result.video_title, TITLE_COLUMNS, 16.0, 0.0, 20.0);
    lines.extend(wrapped(
        &format!("Source: {}", result.video_url),
        SOURCE_COLUMNS,
        10.0,
        0.39,
        12.0,
    ));
    lines.push(TextLine {
        text: String::new(),
        size: 12.0,
        gray: 0.16,
        leading: 14.0,
    });
    lines.extend(wrapped(&result.summary, BODY_COLUMNS, 12.0, 0.16, 15.0));

    let pages = paginate(&lines);
    render(&pages)
}

fn paginate(lines: &[TextLine]) -> Vec<Vec<u8>> {
    let mut pages = Vec::new();
    let mut stream = Vec::new();
    let mut y = PAGE_HEIGHT - MARGIN_TOP;

    for line in lines {
        if y - line.leading < MARGIN_BOTTOM && !stream.is_empty() {
            pages.push(std::mem::take(&mut stream));
            y = PAGE_HEIGHT - MARGIN_TOP;
        }
        if !line.text.is_empty() {
            stream.extend_from_slice(
                format!(
                    "BT /F1 {} Tf {:.2} g {} {:.1} Td (",
                    line.size, line.gray, MARGIN_X, y
                )
                .as_bytes(),
            );
            stream.extend(encode_pdf_text(&line.text));
            stream.extend_from_slice(b") Tj ET\n");
        }
        y -= line.leading;
    }

    pages.push(stream);
    pages
}

fn render(pages: &[Vec<u8>]) -> Vec<u8> {
    let mut objects: Vec<Vec<u8>> = Vec::new();
    let page_count = pages.len();
    // 1: catalog, 2: pages, 3: font, then a page and a content object per page.
    let kids: Vec<String> = (0..page_count)
        .map(|i| format!("{} 0 R", 4 + i * 2))
        .collect();

    objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());
    objects.push(
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            page_count
        )
        .into_bytes(),
    );
    objects.push(
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_vec(),
    );

    for (i, content) in pages.iter().enumerate() {
        let content_id = 5 + i * 2;
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                PAGE_WIDTH, PAGE_HEIGHT, content_id
            )
            .into_bytes(),
        );
        let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        stream.extend_from_slice(content);
        stream.extend_from_slice(b"\nendstream");
        objects.push(stream);
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );
    out
}

/// Escape for a PDF literal string and map to WinAnsi, `?` for the rest.
fn encode_pdf_text(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                bytes.push(b'\\');
                bytes.push(c as u8);
            }
            ' '..='~' => bytes.push(c as u8),
            '\u{a0}'..='\u{ff}' => bytes.push(c as u32 as u8),
            '…' => bytes.push(0x85),
            '‘' => bytes.push(0x91),
            '’' => bytes.push(0x92),
            '“' => bytes.push(0x93),
            '”' => bytes.push(0x94),
            '•' => bytes.push(0x95),
            '–' => bytes.push(0x96),
            '—' => bytes.push(0x97),
            '\t' => bytes.push(b' '),
            _ => bytes.push(b'?'),
        }
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SummaryFormat, VideoDetails};
    use chrono::{TimeZone, Utc};

    fn result_with(title: &str, summary: &str) -> SummaryResult {
        SummaryResult::new(
            "https://www.youtube.com/watch?v=abc123",
            VideoDetails {
                title: title.to_string(),
                thumbnail: "http://img.example/t.jpg".to_string(),
            },
            summary.to_string(),
            SummaryFormat::KeyTopics,
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        )
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    #[test]
    fn text_export_is_raw_summary() {
        let result = result_with("T", "* one\n* two **bold**");
        assert_eq!(to_text(&result), "* one\n* two **bold**");
    }

    #[test]
    fn file_stem_replaces_whitespace_runs() {
        let result = result_with("Intro  to\tX / Y", "s");
        assert_eq!(file_stem(&result), "Intro_to_X_-_Y_summary");
    }

    #[test]
    fn short_summary_fits_one_page() {
        let pdf = to_pdf(&result_with("Intro to X", "X is a short overview."));
        assert!(pdf.starts_with(b"%PDF-1.4"));
        assert!(pdf.ends_with(b"%%EOF\n"));
        assert_eq!(count(&pdf, b"/Type /Page "), 1);
        assert_eq!(count(&pdf, b"(Intro to X) Tj"), 1);
        assert_eq!(
            count(&pdf, b"(Source: https://www.youtube.com/watch?v=abc123) Tj"),
            1
        );
    }

    #[test]
    fn long_summary_flows_onto_more_pages() {
        let body = "A sentence that keeps the body going for a while. ".repeat(200);
        let pdf = to_pdf(&result_with("Long", &body));
        assert!(count(&pdf, b"/Type /Page ") >= 3);
        assert!(count(&pdf, b"/Count ") == 1);
    }

    #[test]
    fn startxref_points_at_xref_table() {
        let pdf = to_pdf(&result_with("Intro", "Body"));
        let text = String::from_utf8_lossy(&pdf);
        let offset: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        assert!(pdf[offset..].starts_with(b"xref\n"));
    }

    #[test]
    fn pdf_text_is_escaped_and_mapped() {
        assert_eq!(encode_pdf_text("a(b)\\c"), b"a\\(b\\)\\\\c".to_vec());
        assert_eq!(encode_pdf_text("•é"), vec![0x95, 0xe9]);
        assert_eq!(encode_pdf_text("日"), b"?".to_vec());
    }

    #[test]
    fn writes_both_exports() {
        let dir = tempfile::tempdir().unwrap();
        let result = result_with("Intro to X", "X is a short overview.");

        let txt = write_text(dir.path(), &result).unwrap();
        let pdf = write_pdf(dir.path(), &result).unwrap();

        assert_eq!(txt.file_name().unwrap(), "Intro_to_X_summary.txt");
        assert_eq!(std::fs::read_to_string(txt).unwrap(), "X is a short overview.");
        assert!(std::fs::read(pdf).unwrap().starts_with(b"%PDF"));
    }
}
