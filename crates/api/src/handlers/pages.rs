//! Handlers for signup page lookups.
//!
//! The campaign comes from the request host; the page is resolved by its
//! normalized code within that campaign.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use rally_core::error::CoreError;
use rally_core::page::{MetaTag, PageLookup, ResolvedPageView};
use rally_core::page_code::validate_page_code;
use rally_core::resolver::PageResolver;
use rally_core::signup::steps::{signup_steps, StepDefinition};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::campaign::CurrentCampaign;
use crate::response::DataResponse;
use crate::state::AppState;

/// Initial render data for the signup page.
#[derive(Debug, Serialize)]
pub struct SignupPageProps {
    pub page: ResolvedPageView,
    pub steps: Vec<StepDefinition>,
    pub meta: Vec<MetaTag>,
}

async fn resolve_page(
    state: &AppState,
    campaign: &rally_core::page::CampaignRef,
    raw_code: &str,
) -> AppResult<ResolvedPageView> {
    let code = validate_page_code(raw_code)?;

    match PageResolver::new(state.store.as_ref())
        .resolve(&code, campaign)
        .await?
    {
        PageLookup::Found(page) => Ok(page),
        PageLookup::NotFound => {
            tracing::debug!(code = %code, campaign_id = campaign.id, "Page not found");
            Err(AppError::Core(CoreError::NotFound {
                entity: "Page",
                key: code,
            }))
        }
    }
}

/// GET /api/v1/pages/{code}
///
/// Resolve a page within the host's campaign.
pub async fn get_page(
    CurrentCampaign(campaign): CurrentCampaign,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let page = resolve_page(&state, &campaign, &code).await?;

    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/pages/{code}/props
///
/// Resolve a page and attach its signup steps and head meta tags.
pub async fn get_signup_props(
    CurrentCampaign(campaign): CurrentCampaign,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let page = resolve_page(&state, &campaign, &code).await?;
    let steps = signup_steps(&page)?;
    let meta = page.meta_tags();

    Ok(Json(DataResponse {
        data: SignupPageProps { page, steps, meta },
    }))
}
