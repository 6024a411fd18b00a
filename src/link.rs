//! Results-link validation.
//!
//! Supported links look like `https://live.myrace.info/?f=<results file>&B=<bib>`.

use url::Url;

use crate::error::ValidationError;

/// Results-site hosts whose pages the extractor understands.
pub const ALLOWED_HOSTS: &[&str] = &["live.myrace.info", "myrace.info", "www.myrace.info"];

/// Query parameter carrying the results-file path.
pub const FILE_PARAM: &str = "f";
/// Query parameter carrying the participant's bib.
pub const BIB_PARAM: &str = "B";

/// A validated link split into the pieces the pipeline needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkParts {
    /// Value of the `f` parameter.
    pub base_path: String,
    pub bib: String,
    pub url: String,
}

impl LinkParts {
    /// The link as it should be loaded, with a scheme.
    pub fn page_url(&self) -> String {
        with_scheme(self.url.trim())
    }
}

/// Check that `url` points at a supported results page and return its bib.
///
/// The bib is returned exactly as it appears in the `B` parameter; bibs may
/// contain letters.
///
/// ```
/// use race_cards::link::validate;
///
/// let bib = validate("https://live.myrace.info/?f=bases/x.clax&B=320").unwrap();
/// assert_eq!(bib, "320");
/// ```
pub fn validate(url: &str) -> Result<String, ValidationError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    let parsed = parse(trimmed)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::UnsupportedScheme(parsed.scheme().to_string()));
    }
    let host = parsed
        .host_str()
        .ok_or_else(|| ValidationError::UnparseableUrl("no host".to_string()))?
        .to_lowercase();
    if !ALLOWED_HOSTS.contains(&host.as_str()) {
        return Err(ValidationError::WrongHost(host));
    }

    query_value(&parsed, FILE_PARAM).ok_or(ValidationError::MissingField(FILE_PARAM))?;
    query_value(&parsed, BIB_PARAM).ok_or(ValidationError::MissingField(BIB_PARAM))
}

/// Split an already validated link into base path and bib.
///
/// Missing pieces come back as empty strings; call [`validate`] first.
pub fn extract_parts(url: &str) -> LinkParts {
    let parsed = parse(url.trim()).ok();
    let value = |key| {
        parsed
            .as_ref()
            .and_then(|u| query_value(u, key))
            .unwrap_or_default()
    };
    LinkParts {
        base_path: value(FILE_PARAM),
        bib: value(BIB_PARAM),
        url: url.to_string(),
    }
}

/// Front-end adapter: `(true, bib)` for a usable link, `(false, reason)` otherwise.
pub fn validate_url(url: &str) -> (bool, String) {
    match validate(url) {
        Ok(bib) => (true, bib),
        Err(err) => (false, err.to_string()),
    }
}

fn parse(url: &str) -> Result<Url, ValidationError> {
    Url::parse(&with_scheme(url)).map_err(|e| ValidationError::UnparseableUrl(e.to_string()))
}

/// Prefix `https://` unless the link already names a scheme. A `://` inside
/// the path or query does not count.
fn with_scheme(url: &str) -> String {
    let has_scheme = url
        .find("://")
        .is_some_and(|i| !url[..i].contains(|c| matches!(c, '/' | '?' | '#')));
    if has_scheme {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}
