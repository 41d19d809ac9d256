//! # snapweb
//!
//! Render a live webpage in headless Chrome and save it as a PDF.
//!
//! The page is loaded, left to reach network idle, scrolled to the bottom so lazy
//! images get requested, and given a bounded wait for every image to finish. It is
//! then printed on US Letter paper with the page title as header and a
//! `page/total` footer.
//!
//! ## Usage
//!
//! ```bash
//! snapweb https://example.com
//! snapweb https://example.com -t pdf -o out/example.pdf
//! ```

mod converter;
mod error;
mod format;
mod loader;
mod pdf_exporter;
mod session;
mod snapshot;

pub use converter::{ConvertOptions, Converter};
pub use error::{ConvertError, Result};
pub use format::OutputFormat;
pub use loader::{LoaderOptions, PageLoader, DEFAULT_IMAGE_TIMEOUT, DEFAULT_NAVIGATION_TIMEOUT};
pub use pdf_exporter::{footer_template, header_template, PdfExporter, PdfOptions};
pub use session::{BrowserOptions, Session, DEFAULT_REQUEST_TIMEOUT};
pub use snapshot::{sanitize_title, PageSnapshot};
