//! Page resolution: route code + campaign -> renderable page data.

use crate::page::{CampaignRef, PageLookup, ResolvedPageView};
use crate::page_code::normalize_page_code;
use crate::store::{PageSource, StoreError};
use crate::types::DbId;

/// Errors from [`PageResolver::resolve`]. Not-found is not an error; it is
/// [`PageLookup::NotFound`].
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The page exists but the user recorded as its creator does not.
    #[error("Page '{code}' references missing creator user {user_id}")]
    MissingCreator { code: String, user_id: DbId },

    /// The data source failed.
    #[error("Data store error: {0}")]
    Store(#[source] StoreError),
}

/// Resolves signup pages against any [`PageSource`].
///
/// Every call re-queries the source. The page and its creator are fetched
/// sequentially and nothing is returned until both lookups finish.
pub struct PageResolver<'a, S: PageSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: PageSource + ?Sized> PageResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Look up the page for `code` within `campaign`.
    pub async fn resolve(
        &self,
        code: &str,
        campaign: &CampaignRef,
    ) -> Result<PageLookup, ResolveError> {
        let normalized = normalize_page_code(code);

        let Some(page) = self
            .source
            .find_page(&normalized, campaign.id)
            .await
            .map_err(ResolveError::Store)?
        else {
            return Ok(PageLookup::NotFound);
        };

        let first_name = self
            .source
            .find_user_first_name(page.created_by)
            .await
            .map_err(ResolveError::Store)?
            .ok_or_else(|| ResolveError::MissingCreator {
                code: normalized.clone(),
                user_id: page.created_by,
            })?;

        Ok(PageLookup::Found(ResolvedPageView {
            code: normalized,
            title: page.title,
            subtitle: page.subtitle,
            background: page.background,
            created_by_first_name: first_name,
        }))
    }
}
