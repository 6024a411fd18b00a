//! Minimal `{{ key }}` templates.
//!
//! Values added with [`Context::text`] are HTML-escaped; only
//! [`Context::markup`] inserts raw HTML, and it is fed by other rendered
//! templates.

use std::collections::BTreeMap;

use crate::error::RenderError;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Template {
    pub name: &'static str,
    source: &'static str,
}

impl Template {
    pub const fn new(name: &'static str, source: &'static str) -> Self {
        Self { name, source }
    }

    /// Substitute every placeholder; an unknown key is an error.
    pub fn render(&self, context: &Context) -> Result<String, RenderError> {
        let mut out = String::with_capacity(self.source.len() + 512);
        let mut rest = self.source;
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find("}}").ok_or_else(|| self.missing("{{"))?;
            let key = after[..end].trim();
            let value = context.get(key).ok_or_else(|| self.missing(key))?;
            out.push_str(value);
            rest = &after[end + 2..];
        }
        out.push_str(rest);
        Ok(out)
    }

    fn missing(&self, key: &str) -> RenderError {
        RenderError::MissingPlaceholder {
            template: self.name,
            key: key.to_string(),
        }
    }
}

/// Escaped values keyed by placeholder name.
#[derive(Debug, Clone, Default)]
pub(crate) struct Context {
    values: BTreeMap<&'static str, String>,
}

impl Context {
    pub fn text(&mut self, key: &'static str, value: impl AsRef<str>) -> &mut Self {
        self.values.insert(key, escape_html(value.as_ref()));
        self
    }

    pub fn markup(&mut self, key: &'static str, html: String) -> &mut Self {
        self.values.insert(key, html);
        self
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
