use std::fmt::Write as _;

use url::Url;

use crate::types::Message;

pub const CONTAINER_ID: &str = "toastify";
pub const TOAST_CLASS: &str = "toastify-toast";

#[must_use]
pub fn toast_id(index: usize) -> String {
    format!("{TOAST_CLASS}-{index}")
}

/// The element hosting every mounted toast.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContainerMarkup {
    pub id: &'static str,
}

impl ContainerMarkup {
    #[must_use]
    pub fn html(&self) -> String {
        format!(
            r#"<div id="{}" role="alert" aria-live="polite" aria-atomic="true"></div>"#,
            self.id
        )
    }
}

impl Default for ContainerMarkup {
    fn default() -> Self {
        Self { id: CONTAINER_ID }
    }
}

/// One toast card, ready to be turned into an element by a host.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ToastMarkup {
    pub id: String,
    pub image: Url,
    pub title: String,
    pub timestamp: String,
    pub body: String,
}

impl ToastMarkup {
    #[must_use]
    pub fn new(index: usize, message: &Message) -> Self {
        Self {
            id: toast_id(index),
            image: message.image.clone(),
            title: message.title.clone(),
            timestamp: message.timestamp.clone(),
            body: message.body.clone(),
        }
    }

    #[must_use]
    pub fn html(&self) -> String {
        let id = escape(&self.id);
        let mut out = String::with_capacity(512);
        let _ = write!(
            out,
            r#"<div id="{id}" class="{TOAST_CLASS}" role="alert" aria-live="assertive" aria-atomic="true">"#
        );
        let _ = write!(
            out,
            r#"<div class="toastify-image"><img src="{}" alt="Toast {id} logo"></div>"#,
            escape(self.image.as_str())
        );
        out.push_str(r#"<div class="toastify-content"><div class="toastify-title">"#);
        let _ = write!(
            out,
            r#"<p class="toastify-subject">{}</p><span class="toastify-time">{}</span>"#,
            escape(&self.title),
            escape(&self.timestamp)
        );
        let _ = write!(
            out,
            r#"</div><p class="toastify-message">{}</p></div></div>"#,
            escape(&self.body)
        );
        out
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{ContainerMarkup, ToastMarkup};
    use crate::types::Message;
    use url::Url;

    fn message(title: &str) -> Message {
        Message {
            image: match Url::parse("https://cdn.example.com/a.png") {
                Ok(url) => url,
                Err(err) => panic!("invalid test url: {err}"),
            },
            title: title.to_string(),
            timestamp: "now".to_string(),
            body: "Deploy finished".to_string(),
        }
    }

    #[test]
    fn toast_html_escapes_user_text() {
        let html = ToastMarkup::new(4, &message("<b>Build</b> & co")).html();
        assert!(html.contains(r#"id="toastify-toast-4""#));
        assert!(html.contains("&lt;b&gt;Build&lt;/b&gt; &amp; co"));
        assert!(html.contains(r#"alt="Toast toastify-toast-4 logo""#));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn container_carries_live_region_attributes() {
        let html = ContainerMarkup::default().html();
        assert!(html.starts_with(r#"<div id="toastify" role="alert" aria-live="polite""#));
    }
}
