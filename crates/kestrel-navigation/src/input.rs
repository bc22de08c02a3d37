//! Address bar input resolution
//!
//! Decides whether typed text is a location or a search query:
//! 1. Anything with a scheme (`://`) or an `about:` URL is used as-is
//! 2. Text containing whitespace is searched
//! 3. Dotted-quad IPv4 and `host:port` get `http://`
//! 4. Dotted names get `https://`
//! 5. Everything else is searched

use crate::error::NavigationError;
use crate::title::BLANK_URL;
use crate::Result;

pub const DEFAULT_SEARCH_TEMPLATE: &str = "https://www.google.com/search?q=%s";

/// Result of resolving address bar input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResolution {
    /// Navigate to a URL
    Navigate(String),
    /// Search URL built from the query
    Search(String),
}

impl InputResolution {
    pub fn url(&self) -> &str {
        match self {
            InputResolution::Navigate(url) | InputResolution::Search(url) => url,
        }
    }

    pub fn into_url(self) -> String {
        match self {
            InputResolution::Navigate(url) | InputResolution::Search(url) => url,
        }
    }

    pub fn is_search(&self) -> bool {
        matches!(self, InputResolution::Search(_))
    }
}

#[derive(Debug, Clone)]
pub struct InputResolver {
    /// Search engine URL template (%s replaced with query)
    search_template: String,
}

impl InputResolver {
    pub fn new() -> Self {
        Self {
            search_template: DEFAULT_SEARCH_TEMPLATE.to_string(),
        }
    }

    pub fn with_search_engine(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        validate_template(&template)?;
        Ok(Self {
            search_template: template,
        })
    }

    pub fn set_search_engine(&mut self, template: impl Into<String>) -> Result<()> {
        let template = template.into();
        validate_template(&template)?;
        self.search_template = template;
        Ok(())
    }

    pub fn search_template(&self) -> &str {
        &self.search_template
    }

    /// Resolve user input into an action
    pub fn resolve(&self, input: &str) -> InputResolution {
        let input = input.trim();

        if input.is_empty() {
            return InputResolution::Navigate(BLANK_URL.to_string());
        }

        if input.contains("://") || input.starts_with("about:") {
            return InputResolution::Navigate(input.to_string());
        }

        if input.chars().any(char::is_whitespace) {
            return InputResolution::Search(self.build_search_url(input));
        }

        if is_ipv4_address(input) || input.split(':').count() == 2 {
            return InputResolution::Navigate(format!("http://{}", input));
        }

        if input.contains('.') {
            return InputResolution::Navigate(format!("https://{}", input));
        }

        InputResolution::Search(self.build_search_url(input))
    }

    /// Build search URL from query
    pub fn build_search_url(&self, query: &str) -> String {
        self.search_template
            .replace("%s", &encode_component(query))
    }
}

impl Default for InputResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_template(template: &str) -> Result<()> {
    if !template.contains("%s") {
        return Err(NavigationError::InvalidSearchTemplate(format!("{} (missing %s)", template)));
    }
    url::Url::parse(&template.replace("%s", "q"))
        .map_err(|e| NavigationError::InvalidSearchTemplate(format!("{}: {}", template, e)))?;
    Ok(())
}

/// Four dot-separated decimal octets, each 0-255
pub fn is_ipv4_address(input: &str) -> bool {
    let octets: Vec<&str> = input.split('.').collect();
    octets.len() == 4
        && octets.iter().all(|octet| {
            !octet.is_empty()
                && octet.len() <= 3
                && octet.bytes().all(|b| b.is_ascii_digit())
                && octet.parse::<u16>().map(|n| n <= 255).unwrap_or(false)
        })
}

/// Percent-encode a query component, leaving `A-Z a-z 0-9 - _ . ! ~ * ' ( )` intact
fn encode_component(input: &str) -> String {
    let mut result = String::with_capacity(input.len() * 3);
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => result.push(byte as char),
            _ => result.push_str(&format!("%{:02X}", byte)),
        }
    }
    result
}
