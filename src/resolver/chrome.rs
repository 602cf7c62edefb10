//! Headless Chrome implementation of the browser boundary
//!
//! `headless_chrome` is a blocking driver, so every call runs on the blocking
//! pool. Locators are evaluated by a small script injected into the page.

use crate::config::{BrowserConfig, TimingConfig};
use crate::resolver::browser::{BrowserLauncher, BrowserSession, ClickOptions, Locator};
use crate::BrowserError;
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Resolves a locator target into the `found` element array
const LOCATE_SCRIPT: &str = r#"
    const norm = s => (s || '').replace(/\s+/g, ' ').trim().toLowerCase();
    let found = [];
    if (target.kind === 'css') {
        found = Array.from(document.querySelectorAll(target.css));
    } else if (target.kind === 'text') {
        const want = norm(target.text);
        found = Array.from(document.querySelectorAll('body *')).filter(el =>
            norm(el.innerText).startsWith(want) &&
            !Array.from(el.children).some(c => norm(c.innerText).startsWith(want)));
    } else {
        const want = norm(target.text);
        found = Array.from(document.querySelectorAll(target.css))
            .filter(el => norm(el.innerText).includes(want));
    }
"#;

/// Launches one headless Chrome per resolution attempt
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    config: BrowserConfig,
    idle_settle: Duration,
    idle_browser_timeout: Duration,
}

impl ChromeLauncher {
    pub fn new(config: &BrowserConfig, timing: &TimingConfig) -> Self {
        Self {
            config: config.clone(),
            idle_settle: timing.idle_settle(),
            idle_browser_timeout: config.idle_timeout(),
        }
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        let config = self.config.clone();
        let idle_browser_timeout = self.idle_browser_timeout;

        let (browser, tab) = tokio::task::spawn_blocking(move || {
            let options = LaunchOptions::default_builder()
                .headless(config.headless)
                .window_size(Some((config.window_width, config.window_height)))
                .idle_browser_timeout(idle_browser_timeout)
                .build()
                .map_err(|e| BrowserError::Launch(e.to_string()))?;

            let browser = Browser::new(options).map_err(|e| BrowserError::Launch(e.to_string()))?;
            let tab = browser
                .new_tab()
                .map_err(|e| BrowserError::Launch(e.to_string()))?;
            Ok::<_, BrowserError>((browser, tab))
        })
        .await
        .map_err(|e| BrowserError::Launch(e.to_string()))??;

        tracing::debug!("Browser launched");

        Ok(Box::new(ChromeSession {
            browser: Some(browser),
            tab,
            idle_settle: self.idle_settle,
        }))
    }
}

/// A single Chrome tab owned by one resolution
pub struct ChromeSession {
    browser: Option<Browser>,
    tab: Arc<Tab>,
    idle_settle: Duration,
}

impl ChromeSession {
    /// Runs a blocking driver call on the blocking pool
    async fn blocking<T, F>(&self, f: F) -> Result<T, BrowserError>
    where
        T: Send + 'static,
        F: FnOnce(Arc<Tab>) -> Result<T, BrowserError> + Send + 'static,
    {
        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || f(tab))
            .await
            .map_err(|e| BrowserError::Automation(e.to_string()))?
    }

    /// Evaluates `action` against the elements matched by `locator`
    async fn eval_locator(&self, locator: &Locator, action: &str) -> Result<Value, BrowserError> {
        let target = match locator {
            Locator::Css(css) => json!({ "kind": "css", "css": css }),
            Locator::Text(text) => json!({ "kind": "text", "text": text }),
            Locator::HasText { css, text } => json!({ "kind": "has", "css": css, "text": text }),
        };
        let script = format!(
            "(() => {{ const target = {}; {} {} }})()",
            target, LOCATE_SCRIPT, action
        );
        self.blocking(move |tab| eval_json(&tab, &script)).await
    }
}

/// Evaluates a script returning `JSON.stringify(...)` and decodes the result
fn eval_json(tab: &Tab, script: &str) -> Result<Value, BrowserError> {
    let object = tab
        .evaluate(script, false)
        .map_err(|e| BrowserError::Automation(e.to_string()))?;

    match object.value {
        Some(Value::String(text)) => serde_json::from_str(&text)
            .map_err(|e| BrowserError::Automation(format!("Bad script result: {}", e))),
        Some(other) => Ok(other),
        None => Ok(Value::Null),
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        let target = url.to_string();
        self.blocking(move |tab| {
            tab.set_default_timeout(timeout);
            tab.navigate_to(&target)
                .and_then(|tab| tab.wait_until_navigated())
                .map(|_| ())
                .map_err(|e| BrowserError::Navigation {
                    url: target.clone(),
                    message: e.to_string(),
                })
        })
        .await
    }

    async fn wait_for_network_idle(&mut self) -> Result<(), BrowserError> {
        self.blocking(|tab| {
            tab.wait_until_navigated()
                .map(|_| ())
                .map_err(|e| BrowserError::Automation(e.to_string()))
        })
        .await?;
        tokio::time::sleep(self.idle_settle).await;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, BrowserError> {
        self.blocking(|tab| Ok(tab.get_url())).await
    }

    async fn count(&mut self, locator: &Locator) -> Result<usize, BrowserError> {
        let value = self
            .eval_locator(locator, "return JSON.stringify(found.length);")
            .await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    async fn attribute(
        &mut self,
        locator: &Locator,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        let action = format!(
            r#"const name = {};
               const el = found[0];
               if (!el) return JSON.stringify(null);
               let v = el.getAttribute(name);
               if (v === null && name === 'href') {{
                   const a = el.closest('a');
                   v = a ? a.getAttribute('href') : null;
               }}
               return JSON.stringify(v);"#,
            Value::String(name.to_string())
        );
        let value = self.eval_locator(locator, &action).await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn inner_text(&mut self, locator: &Locator) -> Result<String, BrowserError> {
        let value = self
            .eval_locator(
                locator,
                "return JSON.stringify(found[0] ? found[0].innerText : null);",
            )
            .await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| BrowserError::NotFound(locator.to_string()))
    }

    async fn click(
        &mut self,
        locator: &Locator,
        options: ClickOptions,
    ) -> Result<(), BrowserError> {
        let action = format!(
            r#"const el = found[0];
               if (!el) return JSON.stringify('missing');
               if (!{} && el.offsetParent === null) return JSON.stringify('hidden');
               el.click();
               return JSON.stringify('clicked');"#,
            options.force
        );

        let click = self.eval_locator(locator, &action);
        let value = match options.timeout {
            Some(limit) => tokio::time::timeout(limit, click)
                .await
                .map_err(|_| BrowserError::Automation(format!("Click on {} timed out", locator)))??,
            None => click.await?,
        };

        match value.as_str() {
            Some("clicked") => Ok(()),
            Some("hidden") => Err(BrowserError::Automation(format!(
                "Element {} is not visible",
                locator
            ))),
            _ => Err(BrowserError::NotFound(locator.to_string())),
        }
    }

    async fn list_hrefs(&mut self) -> Result<Vec<String>, BrowserError> {
        let value = self
            .blocking(|tab| {
                eval_json(
                    &tab,
                    "JSON.stringify(Array.from(document.querySelectorAll('a')).map(a => a.href))",
                )
            })
            .await?;

        Ok(value
            .as_array()
            .map(|hrefs| {
                hrefs
                    .iter()
                    .filter_map(|h| h.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        let browser = self.browser.take();
        self.blocking(move |tab| {
            if let Err(e) = tab.close(true) {
                tracing::debug!("Tab close failed: {}", e);
            }
            drop(browser);
            Ok(())
        })
        .await
    }
}
