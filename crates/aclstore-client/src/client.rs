//! ACL store client implementation

use aclstore::params::{
    GetAclResponse, GetAclsResponse, ModifyAclRequest, RemoteError, SetAclRequest,
};
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Client for an ACL store server.
///
/// The base URL is the server's root path, e.g. `http://host:8080/acl`.
#[derive(Clone, Debug)]
pub struct AclClient {
    base_url: Url,
    http: reqwest::Client,
    token: Option<String>,
}

impl AclClient {
    /// Create a client for the server rooted at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url =
            Url::parse(base_url).map_err(|_| Error::InvalidBaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
            token: None,
        })
    }

    /// Use the given HTTP client for all requests.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// The server root URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Members of ACL `name`.
    pub async fn get(&self, name: &str) -> Result<Vec<String>> {
        let url = self.acl_url(name)?;
        let resp: GetAclResponse = self.fetch(self.http.get(url)).await?;
        Ok(resp.users)
    }

    /// Replace the members of ACL `name`.
    pub async fn set(&self, name: &str, users: &[String]) -> Result<()> {
        let url = self.acl_url(name)?;
        let body = SetAclRequest {
            users: users.to_vec(),
        };
        self.execute(self.http.put(url).json(&body)).await?;
        Ok(())
    }

    /// Add `users` to ACL `name`.
    pub async fn add(&self, name: &str, users: &[String]) -> Result<()> {
        self.modify(
            name,
            ModifyAclRequest {
                add: users.to_vec(),
                remove: Vec::new(),
            },
        )
        .await
    }

    /// Remove `users` from ACL `name`.
    pub async fn remove(&self, name: &str, users: &[String]) -> Result<()> {
        self.modify(
            name,
            ModifyAclRequest {
                add: Vec::new(),
                remove: users.to_vec(),
            },
        )
        .await
    }

    /// Names of all ACLs.
    pub async fn acls(&self) -> Result<Vec<String>> {
        let url = self.acl_url("")?;
        let resp: GetAclsResponse = self.fetch(self.http.get(url)).await?;
        Ok(resp.acls)
    }

    async fn modify(&self, name: &str, body: ModifyAclRequest) -> Result<()> {
        let url = self.acl_url(name)?;
        self.execute(self.http.post(url).json(&body)).await?;
        Ok(())
    }

    /// `{base}/{name}`, with `name` percent-encoded as one segment.
    fn acl_url(&self, name: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(name);
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let resp = self.execute(req).await?;
        Ok(resp.json().await?)
    }

    async fn execute(&self, req: RequestBuilder) -> Result<Response> {
        let req = match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        };
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await?;
        log::debug!("Server answered HTTP {status}: {text}");
        let (code, message) = match serde_json::from_str::<RemoteError>(&text) {
            Ok(remote) => (remote.code, remote.message),
            Err(_) => (String::new(), text),
        };
        Err(Error::Remote {
            status: status.as_u16(),
            code,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acl_url_appends_segment() {
        let client = AclClient::new("http://localhost:8080/acl").unwrap();
        assert_eq!(
            client.acl_url("pets").unwrap().as_str(),
            "http://localhost:8080/acl/pets"
        );
    }

    #[test]
    fn test_acl_url_with_trailing_slash() {
        let client = AclClient::new("http://localhost:8080/acl/").unwrap();
        assert_eq!(
            client.acl_url("pets").unwrap().as_str(),
            "http://localhost:8080/acl/pets"
        );
    }

    #[test]
    fn test_acl_url_escapes_name() {
        let client = AclClient::new("http://localhost/acl").unwrap();
        assert_eq!(
            client.acl_url("a/b c").unwrap().as_str(),
            "http://localhost/acl/a%2Fb%20c"
        );
    }

    #[test]
    fn test_list_url() {
        let client = AclClient::new("http://localhost/acl").unwrap();
        assert_eq!(client.acl_url("").unwrap().as_str(), "http://localhost/acl/");

        let client = AclClient::new("http://localhost").unwrap();
        assert_eq!(client.acl_url("").unwrap().as_str(), "http://localhost/");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            AclClient::new("not a url"),
            Err(Error::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            AclClient::new("mailto:someone@example.com"),
            Err(Error::InvalidBaseUrl(_))
        ));
    }
}
