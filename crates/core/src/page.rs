//! Signup page data as consumed by the resolver and the signup flow.
//!
//! [`PageRecord`] and [`CampaignRef`] are the store-facing shapes;
//! [`ResolvedPageView`] is the transient view built per request and handed
//! to the flow controller.

use serde::{Deserialize, Serialize};

use crate::locale::make_locale_link;
use crate::types::DbId;

/// Placeholder replaced with the page creator's first name in post-signup copy.
pub const FIRST_NAME_PLACEHOLDER: &str = "{{FIRST_NAME}}";

/// Copy key for the post-signup heading.
pub const POST_SIGNUP_TITLE_KEY: &str = "signupPage.postSignupTitle";
/// Copy key for the post-signup paragraph (contains [`FIRST_NAME_PLACEHOLDER`]).
pub const POST_SIGNUP_SUBTITLE_KEY: &str = "signupPage.postSignupSubtitle";
/// Copy key for the "create your own page" heading.
pub const POST_SIGNUP_CREATE_TITLE_KEY: &str = "signupPage.postSignupCreateTitle";
/// Copy key for the "create your own page" paragraph.
pub const POST_SIGNUP_CREATE_SUBTITLE_KEY: &str = "signupPage.postSignupCreateSubtitle";
/// Copy key for the "create your own page" button.
pub const POST_SIGNUP_CREATE_BUTTON_KEY: &str = "signupPage.postSignupCreateButtonLabel";

/// The campaign a request was resolved against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignRef {
    pub id: DbId,
    pub name: String,
    pub domains: Vec<String>,
}

/// A stored page, as returned by a [`crate::store::PageSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub id: DbId,
    pub code: String,
    pub campaign_id: DbId,
    pub title: String,
    pub subtitle: String,
    pub background: String,
    pub created_by: DbId,
}

/// Everything the signup form needs to render a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPageView {
    pub code: String,
    pub title: String,
    pub subtitle: String,
    pub background: String,
    pub created_by_first_name: String,
}

/// Outcome of a successful resolver lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLookup {
    Found(ResolvedPageView),
    NotFound,
}

impl PageLookup {
    /// Convert into an `Option`, dropping the not-found distinction.
    pub fn into_option(self) -> Option<ResolvedPageView> {
        match self {
            Self::Found(view) => Some(view),
            Self::NotFound => None,
        }
    }
}

/// A single `<meta>` tag for the page head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaTag {
    /// Either `name` or `property`, matching the attribute the tag uses.
    pub attribute: &'static str,
    pub key: &'static str,
    pub content: String,
}

impl ResolvedPageView {
    /// Text prefilled into share targets.
    pub fn share_text(&self) -> String {
        format!("{} {}", self.title, self.subtitle)
    }

    /// Substitute the creator's first name into a post-signup copy template.
    pub fn post_signup_subtitle(&self, template: &str) -> String {
        template.replace(FIRST_NAME_PLACEHOLDER, &self.created_by_first_name)
    }

    /// Open Graph and Twitter card tags for the page head.
    pub fn meta_tags(&self) -> Vec<MetaTag> {
        let tag = |attribute, key, content: &str| MetaTag {
            attribute,
            key,
            content: content.to_string(),
        };
        vec![
            tag("name", "og:title", &self.title),
            tag("property", "og:description", &self.subtitle),
            tag("property", "twitter:card", "summary_large_image"),
            tag("property", "twitter:title", &self.title),
            tag("property", "twitter:description", &self.subtitle),
        ]
    }
}

/// What the page shows once the last step has been submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionView {
    pub title_key: &'static str,
    pub subtitle_key: &'static str,
    /// The `subtitle_key` copy with [`FIRST_NAME_PLACEHOLDER`] filled in.
    pub subtitle: String,
    pub created_by_first_name: String,
    pub share_text: String,
    pub create_title_key: &'static str,
    pub create_subtitle_key: &'static str,
    pub create_button_key: &'static str,
    /// Locale-aware link to the page builder.
    pub create_href: String,
}

impl CompletionView {
    /// Build the completion view for `page`, keeping the visitor's locale.
    ///
    /// `subtitle_template` is the localized copy for [`POST_SIGNUP_SUBTITLE_KEY`].
    pub fn for_page(page: &ResolvedPageView, current_path: &str, subtitle_template: &str) -> Self {
        Self {
            title_key: POST_SIGNUP_TITLE_KEY,
            subtitle_key: POST_SIGNUP_SUBTITLE_KEY,
            subtitle: page.post_signup_subtitle(subtitle_template),
            created_by_first_name: page.created_by_first_name.clone(),
            share_text: page.share_text(),
            create_title_key: POST_SIGNUP_CREATE_TITLE_KEY,
            create_subtitle_key: POST_SIGNUP_CREATE_SUBTITLE_KEY,
            create_button_key: POST_SIGNUP_CREATE_BUTTON_KEY,
            create_href: make_locale_link(current_path, "/"),
        }
    }
}
