use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use colored::*;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::{ConvertError, OutputFormat, PageSnapshot, Result, Session};

/// Page geometry and decoration for the printed PDF. Lengths are in inches.
#[derive(Debug, Clone)]
pub struct PdfOptions {
    pub paper_width: f64,
    pub paper_height: f64,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub display_header_footer: bool,
    pub print_background: bool,
}

impl Default for PdfOptions {
    /// US Letter with room above for the title header and below for the page counter.
    fn default() -> Self {
        Self {
            paper_width: 8.5,
            paper_height: 11.0,
            margin_top: 1.5,
            margin_right: 1.0,
            margin_bottom: 1.0,
            margin_left: 1.0,
            display_header_footer: true,
            print_background: true,
        }
    }
}

pub fn header_template(title: &str) -> String {
    format!(
        r#"<div style="font-size:10px; width:100%; text-align:center; margin-top:5px;">{}</div>"#,
        escape_html(title)
    )
}

/// Chrome fills `pageNumber` and `totalPages` at print time.
pub fn footer_template() -> String {
    r#"<div style="font-size:10px; width:100%; text-align:center; margin:0 auto;"><span class="pageNumber"></span>/<span class="totalPages"></span></div>"#
        .to_string()
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub struct PdfExporter {
    options: PdfOptions,
}

impl PdfExporter {
    pub fn new(options: PdfOptions) -> Self {
        Self { options }
    }

    pub fn print_params(&self, title: &str) -> PrintToPdfParams {
        PrintToPdfParams {
            paper_width: Some(self.options.paper_width),
            paper_height: Some(self.options.paper_height),
            margin_top: Some(self.options.margin_top),
            margin_right: Some(self.options.margin_right),
            margin_bottom: Some(self.options.margin_bottom),
            margin_left: Some(self.options.margin_left),
            display_header_footer: Some(self.options.display_header_footer),
            print_background: Some(self.options.print_background),
            header_template: Some(header_template(title)),
            footer_template: Some(footer_template()),
            ..Default::default()
        }
    }

    /// Prints the session's page and writes the PDF to `output`, or to
    /// `<safe title>.pdf` when no path is given.
    pub async fn export(
        &self,
        session: &Session,
        snapshot: &PageSnapshot,
        output: Option<&Path>,
    ) -> Result<PathBuf> {
        let path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| snapshot.default_output_path(OutputFormat::Pdf));

        debug!("Printing \"{}\" to PDF", snapshot.title);
        let pdf_data = session
            .page()
            .pdf(self.print_params(&snapshot.title))
            .await
            .map_err(|e| ConvertError::browser("Failed to generate PDF", e))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&path, pdf_data).await?;

        info!("PDF written to {}", path.display().to_string().blue());
        Ok(path)
    }
}

impl Default for PdfExporter {
    fn default() -> Self {
        Self::new(PdfOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_centers_the_title() {
        let header = header_template("Example Domain");
        assert!(header.contains(">Example Domain</div>"));
        assert!(header.contains("text-align:center"));
        assert!(header.contains("font-size:10px"));
    }

    #[test]
    fn header_escapes_markup_in_title() {
        let header = header_template(r#"Tom & Jerry <3 "quotes""#);
        assert!(header.contains("Tom &amp; Jerry &lt;3 &quot;quotes&quot;"));
        assert!(!header.contains("<3"));
    }

    #[test]
    fn footer_uses_chrome_page_placeholders() {
        let footer = footer_template();
        assert!(footer.contains(r#"<span class="pageNumber"></span>/<span class="totalPages"></span>"#));
    }

    #[test]
    fn print_params_are_letter_with_header_margins() {
        let params = PdfExporter::default().print_params("Title");
        assert_eq!(params.paper_width, Some(8.5));
        assert_eq!(params.paper_height, Some(11.0));
        assert_eq!(params.margin_top, Some(1.5));
        assert_eq!(params.margin_bottom, Some(1.0));
        assert_eq!(params.margin_left, Some(1.0));
        assert_eq!(params.margin_right, Some(1.0));
        assert_eq!(params.display_header_footer, Some(true));
        assert_eq!(params.print_background, Some(true));
        assert!(params.header_template.unwrap().contains("Title"));
        assert!(params.footer_template.unwrap().contains("totalPages"));
    }

    #[test]
    fn custom_options_flow_into_params() {
        let exporter = PdfExporter::new(PdfOptions {
            print_background: false,
            margin_top: 2.0,
            ..PdfOptions::default()
        });
        let params = exporter.print_params("x");
        assert_eq!(params.print_background, Some(false));
        assert_eq!(params.margin_top, Some(2.0));
    }
}
