//! Reddit JSON shapes and conversion into core types.

use exmb_core::{Comment, CommentBuilder, Post, PostBuilder};
use exmb_error::{FeedError, FeedErrorKind, FeedResult};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData<T> {
    pub children: Vec<Thing<T>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thing<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LinkData {
    pub id: String,
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    pub subreddit: String,
    #[serde(default)]
    pub removed_by_category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub locked: Option<bool>,
    #[serde(default)]
    pub stickied: Option<bool>,
}

/// Envelope of `api_type=json` write endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub json: ApiJson<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiJson<T> {
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentResult {
    pub things: Vec<Thing<NamedThing>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NamedThing {
    pub name: String,
}

impl<T> ApiResponse<T> {
    /// Payload, or an API error when Reddit reported any.
    pub fn into_data(self) -> FeedResult<T> {
        if !self.json.errors.is_empty() {
            return Err(FeedError::new(FeedErrorKind::Api {
                status: 200,
                message: serde_json::Value::Array(self.json.errors).to_string(),
            }));
        }
        self.json
            .data
            .ok_or_else(|| decode_error("response carried no data"))
    }
}

pub(crate) fn decode_error(message: impl std::fmt::Display) -> FeedError {
    FeedError::new(FeedErrorKind::Decode(message.to_string()))
}

impl TryFrom<LinkData> for Post {
    type Error = FeedError;

    fn try_from(link: LinkData) -> FeedResult<Self> {
        PostBuilder::default()
            .id(link.id)
            .full_name(link.name)
            .title(link.title)
            .source_url(link.url.unwrap_or_default())
            .channel(link.subreddit)
            .removed_by_category(link.removed_by_category)
            .build()
            .map_err(decode_error)
    }
}

impl TryFrom<CommentData> for Comment {
    type Error = FeedError;

    fn try_from(comment: CommentData) -> FeedResult<Self> {
        CommentBuilder::default()
            .id(comment.id)
            .full_name(comment.name)
            .author(comment.author)
            .locked(comment.locked)
            .stickied(comment.stickied)
            .build()
            .map_err(decode_error)
    }
}

/// Posts of a link listing, in listing order.
pub(crate) fn posts_from_listing(listing: Listing<LinkData>) -> FeedResult<Vec<Post>> {
    listing
        .data
        .children
        .into_iter()
        .filter(|thing| thing.kind == "t3")
        .map(|thing| Post::try_from(thing.data))
        .collect()
}

/// First-level comments from a `/comments/{id}` response.
///
/// The response is `[post listing, comment listing]`; "more" stubs are skipped.
pub(crate) fn comments_from_thread(thread: Vec<serde_json::Value>) -> FeedResult<Vec<Comment>> {
    let Some(comments) = thread.into_iter().nth(1) else {
        return Ok(Vec::new());
    };
    let listing: Listing<serde_json::Value> =
        serde_json::from_value(comments).map_err(decode_error)?;

    listing
        .data
        .children
        .into_iter()
        .filter(|thing| thing.kind == "t1")
        .map(|thing| {
            let data: CommentData = serde_json::from_value(thing.data).map_err(decode_error)?;
            Comment::try_from(data)
        })
        .collect()
}
