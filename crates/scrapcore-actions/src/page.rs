//! The capability a page must offer for the Action DSL interpreter to drive
//! it. Expressed as a trait rather than a concrete `chromiumoxide::Page` so
//! the interpreter can be unit-tested without a real browser (spec §9: a
//! capability, not inheritance).

use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait PageHandle: Send + Sync {
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> anyhow::Result<()>;
    async fn click(&self, selector: &str) -> anyhow::Result<()>;
    async fn hover(&self, selector: &str) -> anyhow::Result<()>;
    async fn type_text(&self, selector: &str, text: &str, clear: bool) -> anyhow::Result<()>;
    async fn exists(&self, selector: &str) -> anyhow::Result<bool>;
    async fn scroll_by(&self, px: i64) -> anyhow::Result<()>;
    async fn mouse_drift(&self) -> anyhow::Result<()>;
}

/// `PageHandle` over a real `chromiumoxide::Page`, used by the browser
/// engine (`scrapcore-fetch`) in production.
pub struct ChromiumPage(pub chromiumoxide::Page);

#[async_trait]
impl PageHandle for ChromiumPage {
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> anyhow::Result<()> {
        tokio::time::timeout(timeout, self.0.find_element(selector))
            .await
            .map_err(|_| anyhow::anyhow!("wait_for timed out waiting for {selector:?}"))?
            .map_err(|e| anyhow::anyhow!("selector {selector:?} not found: {e}"))?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> anyhow::Result<()> {
        let el = self
            .0
            .find_element(selector)
            .await
            .map_err(|e| anyhow::anyhow!("click: selector {selector:?} not found: {e}"))?;
        el.click()
            .await
            .map_err(|e| anyhow::anyhow!("click failed on {selector:?}: {e}"))?;
        Ok(())
    }

    async fn hover(&self, selector: &str) -> anyhow::Result<()> {
        let el = self
            .0
            .find_element(selector)
            .await
            .map_err(|e| anyhow::anyhow!("hover: selector {selector:?} not found: {e}"))?;
        el.hover()
            .await
            .map_err(|e| anyhow::anyhow!("hover failed on {selector:?}: {e}"))?;
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str, clear: bool) -> anyhow::Result<()> {
        let el = self
            .0
            .find_element(selector)
            .await
            .map_err(|e| anyhow::anyhow!("type: selector {selector:?} not found: {e}"))?;
        if clear {
            el.click()
                .await
                .map_err(|e| anyhow::anyhow!("focus before clear failed: {e}"))?;
            self.0
                .evaluate(format!(
                    "document.querySelector({selector:?}).value = ''"
                ))
                .await
                .map_err(|e| anyhow::anyhow!("clear failed on {selector:?}: {e}"))?;
        }
        for ch in text.chars() {
            el.type_str(&ch.to_string())
                .await
                .map_err(|e| anyhow::anyhow!("type failed on {selector:?}: {e}"))?;
        }
        Ok(())
    }

    async fn exists(&self, selector: &str) -> anyhow::Result<bool> {
        Ok(self.0.find_element(selector).await.is_ok())
    }

    async fn scroll_by(&self, px: i64) -> anyhow::Result<()> {
        self.0
            .evaluate(format!("window.scrollBy(0, {px})"))
            .await
            .map_err(|e| anyhow::anyhow!("scroll failed: {e}"))?;
        Ok(())
    }

    async fn mouse_drift(&self) -> anyhow::Result<()> {
        let dx = rand::random::<i8>() as i64;
        let dy = rand::random::<i8>() as i64;
        self.0
            .evaluate(format!(
                "window.dispatchEvent(new MouseEvent('mousemove', {{clientX: {dx}, clientY: {dy}}}))"
            ))
            .await
            .map_err(|e| anyhow::anyhow!("mouse drift failed: {e}"))?;
        Ok(())
    }
}
