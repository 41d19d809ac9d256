use std::path::{Path, PathBuf};
use url::Url;

use crate::{
    BrowserOptions, ConvertError, LoaderOptions, OutputFormat, PageLoader, PdfExporter,
    PdfOptions, Result, Session,
};

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub browser: BrowserOptions,
    pub loader: LoaderOptions,
    pub pdf: PdfOptions,
}

/// Routes a URL to the exporter for the requested format.
pub struct Converter {
    browser: BrowserOptions,
    loader: PageLoader,
    pdf: PdfExporter,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            browser: options.browser,
            loader: PageLoader::new(options.loader),
            pdf: PdfExporter::new(options.pdf),
        }
    }

    pub async fn convert(
        &self,
        url: &str,
        format: OutputFormat,
        output: Option<&Path>,
    ) -> Result<PathBuf> {
        match format {
            OutputFormat::Pdf => {
                Url::parse(url)?;
                self.save_as_pdf(url, output).await
            }
            OutputFormat::Markdown | OutputFormat::Epub => {
                Err(ConvertError::NotImplemented(format))
            }
        }
    }

    /// The session is closed whether or not loading and printing succeed.
    async fn save_as_pdf(&self, url: &str, output: Option<&Path>) -> Result<PathBuf> {
        let session = Session::launch(&self.browser).await?;

        let result = self.load_and_export(&session, url, output).await;

        session.close().await;
        result
    }

    async fn load_and_export(
        &self,
        session: &Session,
        url: &str,
        output: Option<&Path>,
    ) -> Result<PathBuf> {
        let snapshot = self.loader.load(session, url).await?;
        self.pdf.export(session, &snapshot, output).await
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn markdown_and_epub_fail_without_launching_a_browser() {
        let converter = Converter::default();
        for format in [OutputFormat::Markdown, OutputFormat::Epub] {
            match converter.convert("https://example.com", format, None).await {
                Err(ConvertError::NotImplemented(f)) => assert_eq!(f, format),
                other => panic!("unexpected result: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn invalid_url_is_rejected_before_launch() {
        let converter = Converter::default();
        let result = converter
            .convert("not a url", OutputFormat::Pdf, None)
            .await;
        assert!(matches!(result, Err(ConvertError::InvalidUrl(_))));
    }
}
