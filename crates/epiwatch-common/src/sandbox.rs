use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use crate::error::EpiwatchError;

/// Per-request timeout for every outbound call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// An HTTP client capped to an allowlist of hosts.
///
/// Every literature call goes through this client so a misconfigured base URL
/// cannot send queries to an arbitrary host.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    /// Creates a client allowing NCBI E-utilities and loopback hosts.
    pub fn new() -> Result<Self, EpiwatchError> {
        let allowlist = [
            "eutils.ncbi.nlm.nih.gov", // PubMed
            "localhost",
            "127.0.0.1",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let client = ClientBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("epiwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, allowlist })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Validates if a URL is permitted under the current policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        self.allowlist
            .iter()
            .any(|allowed| host == allowed || host.ends_with(&format!(".{}", allowed)))
    }

    /// GET request builder for an allowlisted URL.
    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, EpiwatchError> {
        if !self.is_allowed(url) {
            return Err(EpiwatchError::Security(format!(
                "domain not in allowlist for URL {}",
                url
            )));
        }
        Ok(self.client.get(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowlist_accepts_eutils_and_loopback() {
        let client = SandboxClient::new().unwrap();
        assert!(client.is_allowed("https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi"));
        assert!(client.is_allowed("http://127.0.0.1:8080/esearch.fcgi"));
        assert!(!client.is_allowed("https://example.com/esearch.fcgi"));
        assert!(!client.is_allowed("not a url"));
    }

    #[test]
    fn test_allow_domain_extends_policy() {
        let mut client = SandboxClient::new().unwrap();
        assert!(client.get("https://mirror.example.org/x").is_err());
        client.allow_domain("example.org");
        assert!(client.get("https://mirror.example.org/x").is_ok());
    }
}
