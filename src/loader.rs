use chromiumoxide::cdp::browser_protocol::page::{
    EventLifecycleEvent, SetLifecycleEventsEnabledParams,
};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::Page;
use colored::*;
use futures_util::StreamExt;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::{ConvertError, PageSnapshot, Result, Session};

/// Default bound on navigation plus the wait for network idle.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Default bound on the wait for every `<img>` to report `complete`.
pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(10);

const IMAGES_COMPLETE_SCRIPT: &str =
    "Array.from(document.images).every(img => img.complete)";

#[derive(Debug, Clone)]
pub struct LoaderOptions {
    pub navigation_timeout: Duration,
    pub image_timeout: Duration,
    /// Pixels scrolled per auto-scroll step.
    pub scroll_step: u32,
    pub scroll_delay: Duration,
    pub poll_interval: Duration,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            image_timeout: DEFAULT_IMAGE_TIMEOUT,
            scroll_step: 100,
            scroll_delay: Duration::from_millis(100),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl LoaderOptions {
    /// One auto-scroll step: returns `true` once the bottom is reached, otherwise
    /// scrolls down by `scroll_step` pixels and returns `false`.
    pub fn scroll_step_script(&self) -> String {
        format!(
            r#"
            (() => {{
                const scroller = document.scrollingElement || document.documentElement;
                if (scroller.scrollTop + window.innerHeight >= scroller.scrollHeight) {{
                    return true;
                }}
                scroller.scrollBy(0, {});
                return false;
            }})()
            "#,
            self.scroll_step
        )
    }
}

/// Loads a URL into a session's page and waits for it to settle.
pub struct PageLoader {
    options: LoaderOptions,
}

impl PageLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    pub async fn load(&self, session: &Session, url: &str) -> Result<PageSnapshot> {
        let page = session.page();
        info!("Visiting \"{}\"", url.green());

        self.goto_network_idle(page, url).await?;

        self.auto_scroll(page).await?;

        self.wait_for_images(page).await?;

        let title = page
            .get_title()
            .await
            .map_err(|e| ConvertError::browser("Failed to read page title", e))?
            .unwrap_or_default();

        let html = page
            .content()
            .await
            .map_err(|e| ConvertError::browser("Failed to get page content", e))?;

        let snapshot = PageSnapshot::new(title, html);
        info!(
            "Loaded \"{}\" ({} bytes of HTML)",
            snapshot.title.blue(),
            snapshot.html.len()
        );
        Ok(snapshot)
    }

    async fn goto_network_idle(&self, page: &Page, url: &str) -> Result<()> {
        page.execute(SetLifecycleEventsEnabledParams::new(true))
            .await
            .map_err(|e| ConvertError::browser("Failed to enable lifecycle events", e))?;

        // Subscribe before navigating so no lifecycle event of the new document is missed.
        let mut events = page
            .event_listener::<EventLifecycleEvent>()
            .await
            .map_err(|e| ConvertError::browser("Failed to subscribe to lifecycle events", e))?;

        let wait = async {
            page.goto(url)
                .await
                .map_err(|e| ConvertError::browser(format!("Failed to navigate to {}", url), e))?;

            let main_frame = page
                .mainframe()
                .await
                .map_err(|e| ConvertError::browser("Failed to resolve main frame", e))?;

            // `init` marks the start of the new document; idle events before it belong to
            // the previous one.
            let mut loader_id = None;
            while let Some(event) = events.next().await {
                if main_frame.as_ref().is_some_and(|frame| frame != &event.frame_id) {
                    continue;
                }
                debug!("Lifecycle event: {}", event.name);
                match event.name.as_str() {
                    "init" => loader_id = Some(event.loader_id.clone()),
                    "networkIdle" if loader_id.as_ref() == Some(&event.loader_id) => {
                        return Ok::<(), ConvertError>(());
                    }
                    _ => {}
                }
            }

            Err(ConvertError::Script(
                "Lifecycle event stream ended before network idle".to_string(),
            ))
        };

        timeout(self.options.navigation_timeout, wait)
            .await
            .map_err(|_| ConvertError::NavigationTimeout {
                url: url.to_string(),
                timeout: self.options.navigation_timeout,
            })?
    }

    /// Scrolls until the bottom is reached. There is no cap on the number of steps: a
    /// page that keeps growing while it is scrolled keeps the loop running.
    async fn auto_scroll(&self, page: &Page) -> Result<()> {
        debug!("Scrolling to trigger lazy-loaded content");
        let script = self.options.scroll_step_script();
        let mut steps = 0u64;

        loop {
            let at_bottom = evaluate(page, &script)
                .await?
                .and_then(|value| value.as_bool())
                .unwrap_or(true);
            if at_bottom {
                break;
            }
            steps += 1;
            tokio::time::sleep(self.options.scroll_delay).await;
        }

        debug!("Reached the bottom after {} scroll steps", steps);
        Ok(())
    }

    async fn wait_for_images(&self, page: &Page) -> Result<()> {
        debug!("Waiting up to {:?} for images", self.options.image_timeout);

        let poll = async {
            loop {
                let complete = evaluate(page, IMAGES_COMPLETE_SCRIPT)
                    .await?
                    .and_then(|value| value.as_bool())
                    .unwrap_or(false);
                if complete {
                    return Ok::<(), ConvertError>(());
                }
                tokio::time::sleep(self.options.poll_interval).await;
            }
        };

        timeout(self.options.image_timeout, poll)
            .await
            .map_err(|_| ConvertError::ImageLoadTimeout(self.options.image_timeout))?
    }
}

impl Default for PageLoader {
    fn default() -> Self {
        Self::new(LoaderOptions::default())
    }
}

/// Evaluates an expression, awaiting it if it yields a promise.
async fn evaluate(page: &Page, expression: &str) -> Result<Option<serde_json::Value>> {
    let params = EvaluateParams::builder()
        .expression(expression)
        .await_promise(true)
        .return_by_value(true)
        .build()
        .map_err(ConvertError::Script)?;

    let result = page
        .evaluate_expression(params)
        .await
        .map_err(|e| ConvertError::browser("Failed to evaluate page script", e))?;

    Ok(result.value().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeouts() {
        let options = LoaderOptions::default();
        assert_eq!(options.image_timeout, Duration::from_secs(10));
        assert_eq!(options.navigation_timeout, Duration::from_secs(30));
    }

    #[test]
    fn scroll_step_embeds_distance_and_reports_bottom() {
        let options = LoaderOptions {
            scroll_step: 250,
            ..LoaderOptions::default()
        };
        let script = options.scroll_step_script();
        assert!(script.contains("scroller.scrollBy(0, 250);"));
        assert!(script.contains("scroller.scrollTop + window.innerHeight >= scroller.scrollHeight"));
        assert!(script.contains("return true;"));
        assert!(script.trim_end().ends_with("})()"));
    }

    #[test]
    fn scroll_step_has_no_in_page_wait() {
        // The delay between steps is slept outside the page.
        let script = LoaderOptions::default().scroll_step_script();
        assert!(script.contains("scroller.scrollBy(0, 100);"));
        assert!(!script.contains("async"));
        assert!(!script.contains("setTimeout"));
        assert!(!script.contains("while"));
    }

    #[test]
    fn default_scroll_delay_is_hundred_ms() {
        assert_eq!(LoaderOptions::default().scroll_delay, Duration::from_millis(100));
    }
}
