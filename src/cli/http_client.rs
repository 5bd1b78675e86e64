use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::credentials::Credentials;

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl ApiClient {
    pub fn new(creds: &Credentials) -> anyhow::Result<Self> {
        let mut client = Self::anonymous(&creds.server_url)?;
        client.token = Some(creds.token.clone());
        Ok(client)
    }

    /// Client without a session, used to log in.
    pub fn anonymous(server_url: &str) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: server_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    pub fn get<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let resp = self.authorized(self.client.get(self.url(path))).send()?;
        self.handle_response(resp)
    }

    pub fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        let resp = self
            .authorized(self.client.post(self.url(path)))
            .json(body)
            .send()?;
        self.handle_response(resp)
    }

    /// POST without a body for endpoints that answer 204.
    pub fn post_empty(&self, path: &str) -> anyhow::Result<()> {
        let resp = self.authorized(self.client.post(self.url(path))).send()?;
        self.handle_empty(resp)
    }

    pub fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        let resp = self
            .authorized(self.client.put(self.url(path)))
            .json(body)
            .send()?;
        self.handle_response(resp)
    }

    fn handle_empty(&self, resp: Response) -> anyhow::Result<()> {
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(self.error_of(resp))
        }
    }

    fn handle_response<T: DeserializeOwned>(&self, resp: Response) -> anyhow::Result<T> {
        if resp.status().is_success() {
            let api_resp: ApiResponse<T> = resp.json()?;
            api_resp
                .data
                .ok_or_else(|| anyhow::anyhow!("Server returned an empty response"))
        } else {
            Err(self.error_of(resp))
        }
    }

    fn error_of(&self, resp: Response) -> anyhow::Error {
        let status = resp.status();
        match resp.json::<ApiResponse<()>>() {
            Ok(api_resp) => anyhow::anyhow!(
                api_resp
                    .error
                    .unwrap_or_else(|| "Server error (no details provided)".into())
            ),
            Err(_) => anyhow::anyhow!("Server returned {status}"),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
