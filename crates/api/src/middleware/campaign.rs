//! Campaign extractor keyed on the request `Host` header.

use axum::extract::FromRequestParts;
use axum::http::header::HOST;
use axum::http::request::Parts;
use rally_core::error::CoreError;
use rally_core::page::CampaignRef;
use rally_core::store::CampaignSource;

use crate::error::AppError;
use crate::state::AppState;

/// The campaign whose `domains` list contains the request host.
///
/// ```ignore
/// async fn my_handler(CurrentCampaign(campaign): CurrentCampaign) -> AppResult<Json<()>> {
///     tracing::info!(campaign_id = campaign.id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentCampaign(pub CampaignRef);

impl FromRequestParts<AppState> for CurrentCampaign {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let host = request_host(parts)
            .ok_or_else(|| AppError::BadRequest("Missing Host header".into()))?;

        let campaign = state
            .store
            .find_campaign_by_domain(&host)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFound {
                    entity: "Campaign",
                    key: host.clone(),
                })
            })?;

        tracing::debug!(campaign_id = campaign.id, host = %host, "Resolved campaign");
        Ok(CurrentCampaign(campaign))
    }
}

/// Lowercased `host[:port]` of the request.
///
/// Falls back to the URI authority when no `Host` header is present
/// (HTTP/2 requests carry it there).
fn request_host(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| parts.uri.authority().map(|a| a.as_str()))
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_ascii_lowercase)
}
