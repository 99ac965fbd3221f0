//! Chrome backend over the DevTools protocol.
//!
//! Element queries run as small scripts in the page and come back as JSON;
//! clicks go through real input events.

use super::{Backend, BrowserError, Rect, Session, SessionConfig};
use anyhow::anyhow;
use headless_chrome::{Browser, Element, LaunchOptionsBuilder, Tab};
use serde_json::Value;
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

/// Chrome kills itself after this long without DevTools traffic.
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Launches one Chrome process per session.
#[derive(Debug, Clone, Copy, Default)]
pub struct Chrome;

impl Backend for Chrome {
    fn name(&self) -> &'static str {
        "chrome"
    }

    fn create_session(&self, config: &SessionConfig) -> Result<Box<dyn Session>, BrowserError> {
        Ok(Box::new(ChromeSession::launch(config)?))
    }
}

struct ChromeSession {
    browser: Option<Browser>,
    tab: Option<Arc<Tab>>,
}

impl ChromeSession {
    fn launch(config: &SessionConfig) -> Result<Self, BrowserError> {
        let switches = config.args();
        let args: Vec<&OsStr> = switches.iter().map(OsStr::new).collect();
        let options = LaunchOptionsBuilder::default()
            .headless(config.is_headless())
            .window_size(Some(config.window))
            .path(config.chrome_path.clone())
            .idle_browser_timeout(IDLE_TIMEOUT)
            .args(args)
            .build()
            .map_err(|e| BrowserError::Launch(e.to_string().into()))?;

        let browser = Browser::new(options).map_err(|e| BrowserError::Launch(e.into()))?;
        let tab = browser.new_tab()?;
        Ok(Self {
            browser: Some(browser),
            tab: Some(tab),
        })
    }

    fn tab(&self) -> Result<&Arc<Tab>, BrowserError> {
        self.tab.as_ref().ok_or(BrowserError::SessionClosed)
    }

    /// Evaluate `body` with `el` bound to match `index` of `selector`.
    ///
    /// `body` must `return` a JSON-serializable value.
    fn query(&self, selector: &str, index: usize, body: &str) -> Result<Value, BrowserError> {
        let quoted = serde_json::to_string(selector).map_err(anyhow::Error::from)?;
        let script = format!(
            "(() => {{ const el = document.querySelectorAll({quoted})[{index}]; \
             if (!el) return 'null'; \
             return JSON.stringify({{ v: (() => {{ {body} }})() }}); }})()"
        );

        let result = self.tab()?.evaluate(&script, false)?;
        let json = result
            .value
            .as_ref()
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("no value returned for `{selector}`"))?;
        match serde_json::from_str::<Value>(json).map_err(anyhow::Error::from)? {
            Value::Object(mut map) => Ok(map.remove("v").unwrap_or(Value::Null)),
            _ => Err(BrowserError::no_such_element(selector, index)),
        }
    }

    fn query_bool(&self, selector: &str, body: &str) -> Result<bool, BrowserError> {
        self.query(selector, 0, body)?
            .as_bool()
            .ok_or_else(|| anyhow!("non-boolean result for `{selector}`").into())
    }

    fn element(&self, selector: &str, index: usize) -> Result<Element<'_>, BrowserError> {
        if index >= self.count(selector)? {
            return Err(BrowserError::no_such_element(selector, index));
        }
        let mut elements = self.tab()?.find_elements(selector)?;
        if index < elements.len() {
            Ok(elements.swap_remove(index))
        } else {
            Err(BrowserError::no_such_element(selector, index))
        }
    }
}

/// Approximates WebDriver's visibility rule.
const DISPLAYED: &str = "const s = getComputedStyle(el); const r = el.getBoundingClientRect(); \
     return s.display !== 'none' && s.visibility !== 'hidden' \
     && parseFloat(s.opacity || '1') > 0 && r.width > 0 && r.height > 0;";

const ENABLED: &str = "return !el.disabled;";

const TEXT: &str = "return el.innerText;";

const BOUNDS: &str =
    "const r = el.getBoundingClientRect(); return [r.left, r.top, r.width, r.height];";

/// Synthesized press, move, release on the element's center, offset by
/// `dx`/`dy`. Dispatched on the element; handlers on ancestors see it
/// through bubbling.
const DRAG: &str = "el.scrollIntoView({ block: 'center', inline: 'center' }); \
     const r = el.getBoundingClientRect(); \
     const x = r.left + r.width / 2, y = r.top + r.height / 2; \
     const fire = (type, cx, cy, buttons) => { \
       const init = { bubbles: true, cancelable: true, view: window, clientX: cx, clientY: cy, button: 0, buttons }; \
       el.dispatchEvent(new PointerEvent('pointer' + type, { ...init, pointerId: 1, isPrimary: true })); \
       el.dispatchEvent(new MouseEvent('mouse' + type, init)); \
     }; \
     fire('down', x, y, 1); \
     for (let i = 1; i <= STEPS; i++) fire('move', x + DX * i / STEPS, y + DY * i / STEPS, 1); \
     fire('up', x + DX, y + DY, 0); \
     return true;";

const DRAG_STEPS: u32 = 10;

impl Session for ChromeSession {
    fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let tab = self.tab()?;
        tab.navigate_to(url)?;
        tab.wait_until_navigated()?;
        Ok(())
    }

    fn current_url(&self) -> Result<String, BrowserError> {
        Ok(self.tab()?.get_url())
    }

    fn count(&self, selector: &str) -> Result<usize, BrowserError> {
        let quoted = serde_json::to_string(selector).map_err(anyhow::Error::from)?;
        let script = format!("document.querySelectorAll({quoted}).length");
        let result = self.tab()?.evaluate(&script, false)?;
        result
            .value
            .as_ref()
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| anyhow!("no element count for `{selector}`").into())
    }

    fn is_displayed(&self, selector: &str) -> Result<bool, BrowserError> {
        self.query_bool(selector, DISPLAYED)
    }

    fn is_enabled(&self, selector: &str) -> Result<bool, BrowserError> {
        self.query_bool(selector, ENABLED)
    }

    fn text(&self, selector: &str) -> Result<String, BrowserError> {
        match self.query(selector, 0, TEXT)? {
            Value::String(text) => Ok(text),
            _ => Ok(String::new()),
        }
    }

    fn bounds(&self, selector: &str) -> Result<Rect, BrowserError> {
        let value = self.query(selector, 0, BOUNDS)?;
        let n = |i: usize| value.get(i).and_then(Value::as_f64).unwrap_or_default();
        Ok(Rect {
            x: n(0),
            y: n(1),
            width: n(2),
            height: n(3),
        })
    }

    fn click_nth(&self, selector: &str, index: usize) -> Result<(), BrowserError> {
        self.element(selector, index)?.click()?;
        Ok(())
    }

    fn drag_by(&self, selector: &str, dx: f64, dy: f64) -> Result<(), BrowserError> {
        let body = DRAG
            .replace("STEPS", &DRAG_STEPS.to_string())
            .replace("DX", &format!("({dx})"))
            .replace("DY", &format!("({dy})"));
        self.query(selector, 0, &body)?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), BrowserError> {
        let tab = self.tab.take().ok_or(BrowserError::SessionClosed)?;
        match tab.close(true) {
            Ok(_) => Ok(()),
            // Window or browser already gone: the tab no longer evaluates.
            Err(_) if tab.evaluate("0", false).is_err() => Err(BrowserError::SessionClosed),
            Err(e) => Err(e.into()),
        }
    }

    fn quit(&mut self) -> Result<(), BrowserError> {
        self.tab = None;
        // Dropping the handle ends the process.
        self.browser.take().map(drop).ok_or(BrowserError::SessionClosed)
    }
}
