use crate::{LookupError, Result};
use ringback_core::PhoneCandidate;
use serde_json::{json, Value};
use std::time::Duration;

/// W3C identifier for element references in WebDriver replies.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
const LEGACY_ELEMENT_KEY: &str = "ELEMENT";
const NO_SUCH_ELEMENT: &str = "no such element";
pub const NUMBER_PLACEHOLDER: &str = "{number}";

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub webdriver_url: String,
    pub page_url: String,
    pub name_xpath: String,
    pub page_load_wait: Duration,
    pub user_agent: String,
    pub headless: bool,
    pub timeout: Duration,
}

pub fn new_session_body(headless: bool, user_agent: &str) -> Value {
    let mut args = Vec::new();
    if headless {
        args.push("--headless".to_string());
    }
    args.push("--disable-gpu".to_string());
    args.push("--window-size=1920,1080".to_string());
    args.push(format!("user-agent={user_agent}"));
    json!({
        "capabilities": {
            "alwaysMatch": {
                "browserName": "chrome",
                "goog:chromeOptions": { "args": args }
            }
        }
    })
}

pub fn profile_url(template: &str, candidate: &PhoneCandidate) -> String {
    template.replace(NUMBER_PLACEHOLDER, candidate.as_str())
}

/// Trimmed element text; blank text counts as no name.
pub fn clean_name(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg_attr(not(feature = "remote"), allow(dead_code))]
fn reply_value(body: &str) -> Result<Value> {
    let mut reply: Value = serde_json::from_str(body)
        .map_err(|err| LookupError::Parse(format!("webdriver reply: {err}")))?;
    match reply.get_mut("value") {
        Some(value) => Ok(value.take()),
        None => Err(LookupError::Parse(
            "webdriver reply has no value".to_string(),
        )),
    }
}

#[cfg_attr(not(feature = "remote"), allow(dead_code))]
fn session_id(value: &Value) -> Result<String> {
    value
        .get("sessionId")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| LookupError::Parse("new session reply has no sessionId".to_string()))
}

#[cfg_attr(not(feature = "remote"), allow(dead_code))]
fn element_id(value: &Value) -> Result<String> {
    value
        .get(ELEMENT_KEY)
        .or_else(|| value.get(LEGACY_ELEMENT_KEY))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| LookupError::Parse("element reply has no element id".to_string()))
}

#[cfg_attr(not(feature = "remote"), allow(dead_code))]
fn protocol_error(value: &Value, status: u16) -> LookupError {
    let error = value
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("http status {status}"));
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .lines()
        .next()
        .unwrap_or_default()
        .to_string();
    LookupError::WebDriver { error, message }
}

#[cfg_attr(not(feature = "remote"), allow(dead_code))]
fn is_no_such_element(err: &LookupError) -> bool {
    matches!(err, LookupError::WebDriver { error, .. } if error == NO_SUCH_ELEMENT)
}

#[cfg(feature = "remote")]
mod imp {
    use super::{
        clean_name, element_id, is_no_such_element, new_session_body, profile_url,
        protocol_error, reply_value, session_id, BrowserOptions,
    };
    use crate::source::NameLookup;
    use crate::{LookupError, Result};
    use reqwest::blocking::Client;
    use reqwest::Method;
    use ringback_core::PhoneCandidate;
    use serde_json::{json, Value};
    use std::thread;
    use std::time::Duration;
    use tracing::{debug, warn};
    use url::Url;

    /// Looks up the name shown on a reverse-directory profile page by
    /// driving a browser through a WebDriver endpoint. Each lookup opens
    /// and closes its own browser session.
    #[derive(Debug, Clone)]
    pub struct WebDriverLookup {
        client: Client,
        driver_url: String,
        options: BrowserOptions,
    }

    impl WebDriverLookup {
        pub fn new(options: BrowserOptions) -> Result<Self> {
            let driver = Url::parse(&options.webdriver_url)?;
            Url::parse(&options.page_url.replace(super::NUMBER_PLACEHOLDER, "0"))?;
            let mut builder = Client::builder()
                .timeout(options.timeout)
                .connect_timeout(Duration::from_secs(10));
            // A local driver is never reached through a proxy.
            if matches!(driver.host_str(), Some("localhost" | "127.0.0.1" | "[::1]")) {
                builder = builder.no_proxy();
            }
            let client = builder.build()?;
            Ok(Self {
                client,
                driver_url: driver.as_str().trim_end_matches('/').to_string(),
                options,
            })
        }

        /// Fails unless the driver reports it can create new sessions.
        pub fn ready(&self) -> Result<()> {
            let value = self.execute(Method::GET, &format!("{}/status", self.driver_url), None)?;
            if value.get("ready").and_then(Value::as_bool).unwrap_or(false) {
                return Ok(());
            }
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("driver not ready");
            Err(LookupError::Unavailable(message.to_string()))
        }

        fn start_session(&self) -> Result<Session<'_>> {
            let body = new_session_body(self.options.headless, &self.options.user_agent);
            let value = self.execute(
                Method::POST,
                &format!("{}/session", self.driver_url),
                Some(&body),
            )?;
            let id = session_id(&value)?;
            debug!(session = %id, "webdriver session started");
            Ok(Session {
                lookup: self,
                url: format!("{}/session/{}", self.driver_url, id),
            })
        }

        fn execute(&self, method: Method, url: &str, body: Option<&Value>) -> Result<Value> {
            let mut request = self.client.request(method, url);
            if let Some(body) = body {
                request = request.json(body);
            }
            let response = request.send()?;
            let status = response.status();
            let value = reply_value(&response.text()?)?;
            if !status.is_success() {
                return Err(protocol_error(&value, status.as_u16()));
            }
            Ok(value)
        }
    }

    impl NameLookup for WebDriverLookup {
        fn source_name(&self) -> &'static str {
            "webdriver"
        }

        fn lookup_name(&self, candidate: &PhoneCandidate) -> Result<Option<String>> {
            let session = self.start_session()?;
            session.navigate(&profile_url(&self.options.page_url, candidate))?;
            if !self.options.page_load_wait.is_zero() {
                thread::sleep(self.options.page_load_wait);
            }
            let Some(element) = session.find_xpath(&self.options.name_xpath)? else {
                return Ok(None);
            };
            let text = session.element_text(&element)?;
            Ok(clean_name(&text))
        }
    }

    /// A browser session that is deleted when dropped, on every exit path.
    struct Session<'a> {
        lookup: &'a WebDriverLookup,
        url: String,
    }

    impl Session<'_> {
        fn navigate(&self, page: &str) -> Result<()> {
            self.lookup.execute(
                Method::POST,
                &format!("{}/url", self.url),
                Some(&json!({ "url": page })),
            )?;
            Ok(())
        }

        fn find_xpath(&self, xpath: &str) -> Result<Option<String>> {
            let reply = self.lookup.execute(
                Method::POST,
                &format!("{}/element", self.url),
                Some(&json!({ "using": "xpath", "value": xpath })),
            );
            match reply {
                Ok(value) => element_id(&value).map(Some),
                Err(err) if is_no_such_element(&err) => Ok(None),
                Err(err) => Err(err),
            }
        }

        fn element_text(&self, element: &str) -> Result<String> {
            let value = self.lookup.execute(
                Method::GET,
                &format!("{}/element/{}/text", self.url, element),
                None,
            )?;
            value
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| LookupError::Parse("element text is not a string".to_string()))
        }
    }

    impl Drop for Session<'_> {
        fn drop(&mut self) {
            if let Err(err) = self.lookup.execute(Method::DELETE, &self.url, None) {
                warn!(session = %self.url, error = %err, "failed to close webdriver session");
            }
        }
    }
}

#[cfg(not(feature = "remote"))]
mod imp {
    use super::BrowserOptions;
    use crate::source::NameLookup;
    use crate::{LookupError, Result};
    use ringback_core::PhoneCandidate;

    #[derive(Debug, Clone)]
    pub struct WebDriverLookup {
        options: BrowserOptions,
    }

    impl WebDriverLookup {
        pub fn new(options: BrowserOptions) -> Result<Self> {
            Ok(Self { options })
        }

        pub fn ready(&self) -> Result<()> {
            Err(unavailable())
        }
    }

    impl NameLookup for WebDriverLookup {
        fn source_name(&self) -> &'static str {
            "webdriver"
        }

        fn lookup_name(&self, _candidate: &PhoneCandidate) -> Result<Option<String>> {
            let _ = &self.options;
            Err(unavailable())
        }
    }

    fn unavailable() -> LookupError {
        LookupError::Unavailable("name lookup requires the remote feature".to_string())
    }
}

pub use imp::WebDriverLookup;
