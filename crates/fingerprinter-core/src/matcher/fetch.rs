use crate::error::Error;
use crate::hasher;
use std::io::Read;
use std::time::Duration;
use ureq::AgentBuilder;
use url::Url;

/// Retrieves the content served at a URL.
pub trait Fetcher {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, Error>;

    /// Digest of the served content. The default buffers through
    /// [`Fetcher::fetch`]; implementations that can stream should override it.
    fn fetch_digest(&self, url: &Url) -> Result<String, Error> {
        self.fetch(url).map(|body| hasher::hash_bytes(&body))
    }
}

impl<T: Fetcher + ?Sized> Fetcher for &T {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, Error> {
        (**self).fetch(url)
    }

    fn fetch_digest(&self, url: &Url) -> Result<String, Error> {
        (**self).fetch_digest(url)
    }
}

/// Blocking HTTP fetcher with a per-request timeout.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Self {
        let agent = AgentBuilder::new()
            .timeout(timeout)
            .user_agent(user_agent)
            .build();
        Self { agent }
    }
}

fn fetch_error(url: &Url, reason: impl ToString) -> Error {
    Error::Fetch {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

impl HttpFetcher {
    fn get(&self, url: &Url) -> Result<ureq::Response, Error> {
        let response = self
            .agent
            .request_url("GET", url)
            .call()
            .map_err(|e| fetch_error(url, e))?;
        if !(200..300).contains(&response.status()) {
            return Err(fetch_error(
                url,
                format!("unexpected status {}", response.status()),
            ));
        }
        Ok(response)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, Error> {
        let mut body = Vec::new();
        self.get(url)?
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|e| fetch_error(url, e))?;
        Ok(body)
    }

    /// Streams the body straight into the hasher.
    fn fetch_digest(&self, url: &Url) -> Result<String, Error> {
        let reader = self.get(url)?.into_reader();
        hasher::hash_reader(reader).map_err(|e| fetch_error(url, e))
    }
}

/// Parse a target location, making sure its path ends with `/` so that
/// candidate paths resolve underneath it.
pub fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(Error::Other(format!("{} cannot be used as a base URL", raw)));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Absolute URL of a release path under `base`, each segment percent-encoded.
pub fn candidate_url(base: &Url, path_value: &str) -> Result<Url, Error> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| Error::Other(format!("{} cannot be used as a base URL", base)))?;
        segments.pop_if_empty();
        segments.extend(path_value.trim_start_matches('/').split('/'));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_adds_trailing_slash() {
        let url = normalize_base_url("http://example.com/blog").unwrap();
        assert_eq!(url.as_str(), "http://example.com/blog/");

        let url = normalize_base_url("http://example.com").unwrap();
        assert_eq!(url.as_str(), "http://example.com/");
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize_base_url("not a url").is_err());
        assert!(normalize_base_url("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_candidate_url_resolves_under_base() {
        let base = normalize_base_url("http://example.com/blog/").unwrap();
        let url = candidate_url(&base, "/wp-includes/js/jquery.js").unwrap();
        assert_eq!(url.as_str(), "http://example.com/blog/wp-includes/js/jquery.js");
    }

    #[test]
    fn test_candidate_url_percent_encodes_segments() {
        let base = normalize_base_url("http://example.com/").unwrap();
        let url = candidate_url(&base, "/assets/my file#1.css").unwrap();
        assert_eq!(url.as_str(), "http://example.com/assets/my%20file%231.css");
    }
}
