use std::fmt;
use std::str::FromStr;

use crate::ConvertError;

/// Output formats the CLI advertises. Only [`OutputFormat::Pdf`] has an exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pdf,
    Markdown,
    Epub,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Markdown => "md",
            OutputFormat::Epub => "epub",
        }
    }

    /// Human readable name used in the confirmation line.
    pub fn label(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "PDF",
            OutputFormat::Markdown => "Markdown",
            OutputFormat::Epub => "EPUB",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "markdown" => Ok(OutputFormat::Markdown),
            "epub" => Ok(OutputFormat::Epub),
            _ => Err(ConvertError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsing_ignores_case() {
        for input in ["PDF", "Pdf", "pdf", "pDf"] {
            assert_eq!(input.parse::<OutputFormat>().unwrap(), OutputFormat::Pdf);
        }
        assert_eq!("MarkDown".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("EPUB".parse::<OutputFormat>().unwrap(), OutputFormat::Epub);
    }

    #[test]
    fn unknown_format_is_rejected_with_original_spelling() {
        match "DocX".parse::<OutputFormat>() {
            Err(ConvertError::UnsupportedFormat(s)) => assert_eq!(s, "DocX"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!("".parse::<OutputFormat>().is_err());
        assert!(" pdf".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn extensions_and_labels() {
        assert_eq!(OutputFormat::Pdf.extension(), "pdf");
        assert_eq!(OutputFormat::Markdown.extension(), "md");
        assert_eq!(OutputFormat::Epub.label(), "EPUB");
        assert_eq!(OutputFormat::Pdf.to_string(), "PDF");
    }
}
