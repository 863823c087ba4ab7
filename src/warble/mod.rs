//! Represents a single warble (message) on a Warbler instance.

mod page;

use crate::{
    client::Client,
    errors::{InvalidWarbleUrl, LikeError, WarbleError},
    heart::{Heart, LikeCount},
    meta::{LikeState, Page, WarbleId},
    stdx::error::{Assume, assumption},
};

use chrono::NaiveDate;
use page::Detail;
use reqwest::StatusCode;
use std::{fmt, sync::Arc};
use tokio::sync::Mutex;
use url::Url;

/// Represents a warble: one message on a Warbler instance.
///
/// `Warble` is a handle. Cloning is cheap, and clones share one lazily-filled
/// cache of the message's detail page, so repeated accessor calls cost at
/// most one network request.
#[derive(Clone)]
pub struct Warble {
    pub(crate) client: Client,
    pub(crate) id: WarbleId,
    page: Arc<Mutex<Option<Detail>>>,
}

impl fmt::Debug for Warble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Warble")
            // omitting `client`
            .field("id", &self.id)
            .field("page", &self.page)
            .finish()
    }
}

impl Warble {
    pub(crate) async fn new_with_client(
        id: WarbleId,
        client: &Client,
    ) -> Result<Option<Self>, WarbleError> {
        let (status, html) = client.get_page(&format!("messages/{id}")).await?;

        // A missing message either 404s or, on older checkouts, crashes the
        // route outright. Both mean "no such warble" here.
        if status == StatusCode::NOT_FOUND || status.is_server_error() {
            return Ok(None);
        }

        let Some(detail) = page::parse(&html)? else {
            return Ok(None);
        };

        Ok(Some(Self {
            client: client.clone(),
            id,
            page: Arc::new(Mutex::new(Some(detail))),
        }))
    }

    pub(crate) fn from_url_with_client(
        url: &str,
        client: &Client,
    ) -> Result<Self, InvalidWarbleUrl> {
        let url = Url::parse(url)
            .map_err(|err| InvalidWarbleUrl::new(format!("`{url}` failed to parse: {err}")))?;

        match Page::from_path(url.path()) {
            Page::Warble(id) => Ok(Self::untracked(client, id)),
            Page::Home | Page::Other => Err(InvalidWarbleUrl::new(format!(
                "`{url}` does not follow the `/messages/{{id}}` structure expected of a warble url"
            ))),
        }
    }

    /// A handle with an empty page cache, for warbles found on listing pages.
    pub(crate) fn untracked(client: &Client, id: WarbleId) -> Self {
        Self {
            client: client.clone(),
            id,
            page: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the id the server assigned this warble.
    #[inline]
    #[must_use]
    pub fn id(&self) -> WarbleId {
        self.id
    }

    /// Returns the message text.
    pub async fn text(&self) -> Result<String, WarbleError> {
        Ok(self.detail().await?.text)
    }

    /// Returns the username of the account that posted this warble.
    pub async fn poster(&self) -> Result<String, WarbleError> {
        Ok(self.detail().await?.poster)
    }

    /// Returns the date this warble was posted on.
    pub async fn posted_on(&self) -> Result<NaiveDate, WarbleError> {
        Ok(self.detail().await?.posted_on)
    }

    /// Returns the warble's like count as the server last rendered it.
    pub async fn likes(&self) -> Result<LikeCount, WarbleError> {
        Ok(self.detail().await?.likes)
    }

    /// Mints a [`Heart`] for this warble.
    ///
    /// `state` is the icon state currently observed, and `viewed_from` is the
    /// page the heart sits on. The page matters: only hearts on the
    /// root/listing page move the page-level like counter when clicked.
    #[must_use]
    pub fn heart(&self, state: LikeState, viewed_from: Page) -> Heart {
        Heart::new(self.clone(), state, viewed_from)
    }

    /// Asks the server to toggle the session user's like on this warble.
    ///
    /// The server owns the direction of the toggle: liked becomes not-liked
    /// and vice versa, whatever this client believed beforehand. For the
    /// stateful icon-and-counter flow, use a [`Heart`] instead.
    ///
    /// # Errors
    ///
    /// [`LikeError::OwnWarble`] when the session user posted this warble; the
    /// instance refuses to let users like their own messages.
    pub async fn toggle_like(&self) -> Result<(), LikeError> {
        self.client.toggle_like(self.id).await
    }

    async fn detail(&self) -> Result<Detail, WarbleError> {
        let mut guard = self.page.lock().await;

        if let Some(detail) = guard.as_ref() {
            return Ok(detail.clone());
        }

        let (status, html) = self.client.get_page(&format!("messages/{}", self.id)).await?;

        assumption!(
            status.is_success(),
            "detail page for warble `{}` should respond with success, got `{status}`",
            self.id
        );

        let detail = page::parse(&html)?.assumption(format!(
            "warble `{}` should still exist on the instance",
            self.id
        ))?;

        *guard = Some(detail.clone());

        Ok(detail)
    }
}
