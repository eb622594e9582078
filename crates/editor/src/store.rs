//! Store seam between the editor and the placement API.
//!
//! [`WidgetStore`] mirrors the placement endpoints one call per method.
//! [`HttpWidgetStore`] implements it over HTTP with [`reqwest`].

use async_trait::async_trait;
use edusite_core::layout::SidebarPosition;
use edusite_core::types::DbId;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::catalog::{EditorCatalog, PositionSummary, WidgetSummary};
use crate::config::EditorConfig;
use crate::error::{EditorError, EditorResult};
use crate::snapshot::PlacedWidget;

/// Partial update of a placed widget. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WidgetPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[async_trait]
pub trait WidgetStore: Send + Sync {
    async fn list(&self, site_id: DbId) -> EditorResult<Vec<PlacedWidget>>;

    async fn create(
        &self,
        site_id: DbId,
        widget_slug: &str,
        position_slug: &str,
    ) -> EditorResult<PlacedWidget>;

    async fn move_instance(
        &self,
        site_id: DbId,
        instance_id: DbId,
        position_slug: &str,
        order: i32,
    ) -> EditorResult<PlacedWidget>;

    async fn update(
        &self,
        site_id: DbId,
        instance_id: DbId,
        patch: &WidgetPatch,
    ) -> EditorResult<PlacedWidget>;

    async fn delete(&self, site_id: DbId, instance_id: DbId) -> EditorResult<()>;

    async fn load_layout(&self, site_id: DbId) -> EditorResult<SidebarPosition>;

    async fn save_layout(
        &self,
        site_id: DbId,
        sidebar_position: SidebarPosition,
    ) -> EditorResult<SidebarPosition>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct LayoutView {
    sidebar_position: SidebarPosition,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
}

/// HTTP client for the placement API of one server.
pub struct HttpWidgetStore {
    client: reqwest::Client,
    api_url: String,
}

impl HttpWidgetStore {
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Reuse an existing [`reqwest::Client`] and its connection pool.
    pub fn with_client(client: reqwest::Client, config: &EditorConfig) -> Self {
        Self {
            client,
            api_url: config.api_url(),
        }
    }

    /// Fetch the widgets available to a site and the positions of its
    /// template.
    pub async fn load_catalog(
        &self,
        site_id: DbId,
        template_id: DbId,
    ) -> EditorResult<EditorCatalog> {
        let response = self
            .client
            .get(format!("{}/sites/{site_id}/available-widgets", self.api_url))
            .send()
            .await?;
        let widgets: DataEnvelope<Vec<WidgetSummary>> = Self::parse_response(response).await?;

        let response = self
            .client
            .get(format!(
                "{}/templates/{template_id}/widget-positions",
                self.api_url
            ))
            .send()
            .await?;
        let positions: DataEnvelope<Vec<PositionSummary>> = Self::parse_response(response).await?;

        Ok(EditorCatalog::new(widgets.data, positions.data))
    }

    fn widgets_url(&self, site_id: DbId) -> String {
        format!("{}/sites/{site_id}/widgets", self.api_url)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, decoding the API
    /// error body otherwise.
    async fn ensure_success(response: reqwest::Response) -> EditorResult<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(api_error(status.as_u16(), &body));
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> EditorResult<T> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn check_status(response: reqwest::Response) -> EditorResult<()> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

/// Build an [`EditorError::Api`] from a non-2xx response body.
pub(crate) fn api_error(status: u16, body: &str) -> EditorError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(decoded) => EditorError::Api {
            status,
            code: decoded.code,
            message: decoded.error,
        },
        Err(_) => EditorError::Api {
            status,
            code: "UNKNOWN".to_string(),
            message: body.to_string(),
        },
    }
}

#[async_trait]
impl WidgetStore for HttpWidgetStore {
    async fn list(&self, site_id: DbId) -> EditorResult<Vec<PlacedWidget>> {
        let response = self.client.get(self.widgets_url(site_id)).send().await?;
        Self::parse_response(response).await
    }

    async fn create(
        &self,
        site_id: DbId,
        widget_slug: &str,
        position_slug: &str,
    ) -> EditorResult<PlacedWidget> {
        let response = self
            .client
            .post(self.widgets_url(site_id))
            .json(&json!({
                "widget_slug": widget_slug,
                "position_slug": position_slug,
            }))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn move_instance(
        &self,
        site_id: DbId,
        instance_id: DbId,
        position_slug: &str,
        order: i32,
    ) -> EditorResult<PlacedWidget> {
        let response = self
            .client
            .post(format!("{}/{instance_id}/move", self.widgets_url(site_id)))
            .json(&json!({
                "position_slug": position_slug,
                "order": order,
            }))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn update(
        &self,
        site_id: DbId,
        instance_id: DbId,
        patch: &WidgetPatch,
    ) -> EditorResult<PlacedWidget> {
        let response = self
            .client
            .patch(format!("{}/{instance_id}", self.widgets_url(site_id)))
            .json(patch)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn delete(&self, site_id: DbId, instance_id: DbId) -> EditorResult<()> {
        let response = self
            .client
            .delete(format!("{}/{instance_id}", self.widgets_url(site_id)))
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn load_layout(&self, site_id: DbId) -> EditorResult<SidebarPosition> {
        let response = self
            .client
            .get(format!("{}/sites/{site_id}/layout", self.api_url))
            .send()
            .await?;
        let view: DataEnvelope<LayoutView> = Self::parse_response(response).await?;
        Ok(view.data.sidebar_position)
    }

    async fn save_layout(
        &self,
        site_id: DbId,
        sidebar_position: SidebarPosition,
    ) -> EditorResult<SidebarPosition> {
        let response = self
            .client
            .post(format!("{}/sites/{site_id}/layout", self.api_url))
            .json(&json!({ "sidebar_position": sidebar_position }))
            .send()
            .await?;
        let view: DataEnvelope<LayoutView> = Self::parse_response(response).await?;
        Ok(view.data.sidebar_position)
    }
}

// ---------------------------------------------------------------------------
// In-memory store for editor tests
// ---------------------------------------------------------------------------
