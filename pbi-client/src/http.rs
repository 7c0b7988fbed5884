use crate::api::PowerBiApi;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::types::{
    AssignToCapacityRequest, Capacity, CreateWorkspaceRequest, ListResponse, Workspace,
};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

/// HTTPS+JSON implementation of [`PowerBiApi`].
///
/// Identifiers are always pushed as individual path segments, so they are
/// percent-escaped and can never change the shape of the request path.
///
/// # Examples
///
/// ```rust,no_run
/// # async fn example() -> pbi_client::Result<()> {
/// use pbi_client::{ClientConfig, HttpClient, PowerBiApi};
///
/// let client = HttpClient::new(ClientConfig::default().with_access_token("token"))?;
/// match client.get_workspace("f089354e-8366-4e18-aea3-4cb4a3a50b48").await? {
///     Some(ws) => println!("{} is on capacity {}", ws.name, ws.capacity_id),
///     None => println!("no such workspace"),
/// }
/// # Ok(())
/// # }
/// ```
pub struct HttpClient {
    client: Client,
    config: ClientConfig,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Build `<base_url>/<segments...>`, escaping each segment.
    ///
    /// Empty, `.` and `..` segments are rejected: the URL parser would drop or
    /// collapse them, changing which resource the request addresses.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(ClientError::InvalidUrl(format!(
                "'{bad}' is not a valid path segment"
            )));
        }

        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::InvalidUrl(format!(
                    "{} cannot be used as a base URL",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: &Url) -> RequestBuilder {
        let builder = self.client.request(method, url.clone());
        match &self.config.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, method: Method, url: &Url, builder: RequestBuilder) -> Result<Response> {
        debug!(%method, url = %url, "Sending Power BI request");
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(%method, url = %url, error = %e, "Failed to read error response body");
                format!("<failed to read response body: {e}>")
            }
        };
        warn!(%method, url = %url, %status, "Power BI request failed");
        Err(ClientError::Status {
            method,
            url: url.to_string(),
            status,
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(url: &Url, response: Response) -> Result<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|source| ClientError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl PowerBiApi for HttpClient {
    async fn list_capacities(&self) -> Result<Vec<Capacity>> {
        let url = self.endpoint(&["capacities"])?;
        let response = self
            .send(Method::GET, &url, self.request(Method::GET, &url))
            .await?;
        let list: ListResponse<Capacity> = Self::decode(&url, response).await?;
        Ok(list.into_items())
    }

    async fn create_workspace(&self, name: &str) -> Result<Workspace> {
        let mut url = self.endpoint(&["groups"])?;
        url.query_pairs_mut().append_pair("workspaceV2", "True");

        let builder = self
            .request(Method::POST, &url)
            .json(&CreateWorkspaceRequest { name });
        let response = self.send(Method::POST, &url, builder).await?;
        let workspace: Workspace = Self::decode(&url, response).await?;

        info!(workspace_id = %workspace.id, name = %workspace.name, "Workspace created");
        Ok(workspace)
    }

    async fn get_workspace(&self, id: &str) -> Result<Option<Workspace>> {
        let mut url = self.endpoint(&["groups"])?;
        url.query_pairs_mut()
            .append_pair("$filter", &format!("id eq '{}'", odata_literal(id)));

        let response = match self
            .send(Method::GET, &url, self.request(Method::GET, &url))
            .await
        {
            Ok(response) => response,
            Err(ClientError::Status { status, .. }) if status == StatusCode::NOT_FOUND => {
                debug!(workspace_id = %id, "Workspace not found");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let list: ListResponse<Workspace> = Self::decode(&url, response).await?;
        // Only trust a record that carries the requested ID
        Ok(list.into_items().into_iter().find(|w| w.id == id))
    }

    async fn delete_workspace(&self, id: &str) -> Result<()> {
        let url = self.endpoint(&["groups", id])?;
        self.send(Method::DELETE, &url, self.request(Method::DELETE, &url))
            .await?;

        info!(workspace_id = %id, "Workspace deleted");
        Ok(())
    }

    async fn assign_workspace_to_capacity(
        &self,
        workspace_id: &str,
        capacity_id: &str,
    ) -> Result<()> {
        let url = self.endpoint(&["groups", workspace_id, "AssignToCapacity"])?;
        let builder = self
            .request(Method::POST, &url)
            .json(&AssignToCapacityRequest { capacity_id });
        self.send(Method::POST, &url, builder).await?;

        info!(workspace_id = %workspace_id, capacity_id = %capacity_id, "Workspace assigned to capacity");
        Ok(())
    }
}

/// Escape a value for use inside a single-quoted OData string literal
fn odata_literal(value: &str) -> String {
    value.replace('\'', "''")
}
