use chromiumoxide::{Browser, BrowserConfig, Page};
use colored::*;
use futures_util::StreamExt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::{ConvertError, Result};

/// Long documents can take minutes to print; chromiumoxide's own default is 30 s.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub window_size: (u32, u32),
    pub chrome_executable: Option<PathBuf>,
    pub no_sandbox: bool,
    /// Upper bound chromiumoxide applies to every protocol call, `page.pdf` included.
    pub request_timeout: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1280, 720),
            chrome_executable: None,
            no_sandbox: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl BrowserOptions {
    fn to_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .window_size(self.window_size.0, self.window_size.1)
            .request_timeout(self.request_timeout);

        if !self.headless {
            builder = builder.with_head();
        }
        if self.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = &self.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        builder
            .build()
            .map_err(ConvertError::Config)
    }
}

/// A running browser, its CDP handler task and the single page a conversion works on.
///
/// Call [`Session::close`] when done. Dropping a session without closing it aborts the
/// handler and leaves the browser process to chromiumoxide's own drop.
pub struct Session {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
}

impl Session {
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let config = options.to_config()?;

        info!(
            "Launching {} browser",
            if options.headless { "headless" } else { "headed" }
        );
        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ConvertError::browser("Failed to launch browser", e))?;

        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if let Err(err) = h {
                    // Only log if it's not a common websocket deserialization error
                    let err_str = err.to_string();
                    if !err_str.contains("data did not match any variant")
                        && !err_str.contains("untagged enum Message")
                    {
                        error!("Browser handler error: {}", err);
                    } else {
                        debug!("Chrome protocol message ignored: {}", err);
                    }
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                shut_down(&mut browser).await;
                handler.abort();
                return Err(ConvertError::browser("Failed to create new page", e));
            }
        };

        Ok(Self {
            browser,
            handler,
            page,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Closes the browser, reaps its process and stops the handler task.
    pub async fn close(mut self) {
        shut_down(&mut self.browser).await;
        self.handler.abort();
        debug!("{}", "Browser session closed".dimmed());
    }
}

/// Process-level operations needed to stop a browser.
trait BrowserProcess {
    async fn close(&mut self) -> std::result::Result<(), String>;
    async fn kill(&mut self);
    async fn wait(&mut self) -> io::Result<()>;
}

impl BrowserProcess for Browser {
    async fn close(&mut self) -> std::result::Result<(), String> {
        Browser::close(self).await.map(|_| ()).map_err(|e| e.to_string())
    }

    async fn kill(&mut self) {
        if let Some(Err(e)) = Browser::kill(self).await {
            warn!("Failed to kill browser process: {}", e);
        }
    }

    async fn wait(&mut self) -> io::Result<()> {
        Browser::wait(self).await.map(|_| ())
    }
}

/// A browser that did not take the close command is killed, otherwise `wait` never returns.
async fn shut_down<B: BrowserProcess>(browser: &mut B) {
    if let Err(e) = browser.close().await {
        warn!("Failed to close browser cleanly, killing it: {}", e);
        browser.kill().await;
    }
    if let Err(e) = browser.wait().await {
        warn!("Failed to wait for browser process: {}", e);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.handler.abort();
    }
}
