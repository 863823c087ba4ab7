//! Represents an account on a Warbler instance.

mod page;

use crate::{
    client::{Client, user_cards, warble_id_from_path},
    errors::{FollowError, FollowRequestError, FollowingError, UserError},
    stdx::error::{Assume, assumption},
    warble::Warble,
};

use page::Profile;
use reqwest::StatusCode;
use scraper::Selector;
use std::{fmt, sync::Arc};
use tokio::sync::Mutex;

pub use page::Stats;

/// Represents an account on a Warbler instance.
///
/// Like [`Warble`], this is a cheap-to-clone handle; clones share one
/// lazily-filled cache of the account's profile page.
#[derive(Clone)]
pub struct User {
    client: Client,
    id: u32,
    page: Arc<Mutex<Option<Profile>>>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            // omitting `client`
            .field("id", &self.id)
            .field("page", &self.page)
            .finish()
    }
}

impl User {
    pub(crate) async fn new_with_client(id: u32, client: &Client) -> Result<Option<Self>, UserError> {
        let (status, html) = client.get_page(&format!("users/{id}")).await?;

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let Some(profile) = page::parse(&html)? else {
            return Ok(None);
        };

        Ok(Some(Self {
            client: client.clone(),
            id,
            page: Arc::new(Mutex::new(Some(profile))),
        }))
    }

    /// A handle with an empty page cache, for accounts found on listing pages.
    pub(crate) fn untracked(client: &Client, id: u32) -> Self {
        Self {
            client: client.clone(),
            id,
            page: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the id the server assigned this account.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the account's username, without the display `@`.
    pub async fn username(&self) -> Result<String, UserError> {
        Ok(self.profile().await?.username)
    }

    /// Returns the account's bio, if one is set.
    pub async fn bio(&self) -> Result<Option<String>, UserError> {
        Ok(self.profile().await?.bio)
    }

    /// Returns the account's location, if one is set.
    pub async fn location(&self) -> Result<Option<String>, UserError> {
        Ok(self.profile().await?.location)
    }

    /// Returns the stat row of the account's profile: warbles posted,
    /// following, followers, and likes given.
    pub async fn stats(&self) -> Result<Stats, UserError> {
        Ok(self.profile().await?.stats)
    }

    /// Returns handles to the warbles this account has posted, newest first.
    ///
    /// Always refetches; the profile list moves as the account posts.
    pub async fn warbles(&self) -> Result<Vec<Warble>, UserError> {
        self.listed_warbles(&format!("users/{}", self.id)).await
    }

    /// Returns handles to the warbles this account has liked.
    ///
    /// Always refetches; the likes list moves as the account clicks hearts.
    pub async fn liked(&self) -> Result<Vec<Warble>, UserError> {
        self.listed_warbles(&format!("users/{}/likes", self.id)).await
    }

    /// Returns the accounts this account follows.
    ///
    /// Private accounts only show their follow lists to themselves and to
    /// accounts already following them; anyone else gets
    /// [`FollowingError::NotAuthorized`].
    pub async fn following(&self) -> Result<Vec<User>, FollowingError> {
        self.listed_users(&format!("users/{}/following", self.id)).await
    }

    /// Returns the accounts following this account.
    ///
    /// Subject to the same visibility rule as [`following`](User::following).
    pub async fn followers(&self) -> Result<Vec<User>, FollowingError> {
        self.listed_users(&format!("users/{}/followers", self.id)).await
    }

    /// Follows this account as the session's user.
    ///
    /// Public accounts are followed immediately. A private account instead
    /// collects the attempt as a pending request, which its owner sees via
    /// [`Client::notifications`](crate::Client::notifications); either way
    /// this call succeeds.
    pub async fn follow(&self) -> Result<(), FollowError> {
        self.client.follow(self.id).await
    }

    /// Unfollows this account as the session's user.
    pub async fn unfollow(&self) -> Result<(), FollowError> {
        self.client.unfollow(self.id).await
    }

    async fn profile(&self) -> Result<Profile, UserError> {
        let mut guard = self.page.lock().await;

        if let Some(profile) = guard.as_ref() {
            return Ok(profile.clone());
        }

        let (status, html) = self.client.get_page(&format!("users/{}", self.id)).await?;

        assumption!(
            status.is_success(),
            "profile page for user `{}` should respond with success, got `{status}`",
            self.id
        );

        let profile = page::parse(&html)?.assumption(format!(
            "user `{}` should still exist on the instance",
            self.id
        ))?;

        *guard = Some(profile.clone());

        Ok(profile)
    }

    async fn listed_users(&self, path: &str) -> Result<Vec<User>, FollowingError> {
        let (status, html) = self.client.get_page(path).await?;

        // Unauthorized follow-list views bounce back to the profile with a
        // flash rather than erroring.
        if status.is_redirection() {
            return Err(FollowingError::NotAuthorized);
        }

        assumption!(
            status.is_success(),
            "listing page `{path}` should respond with success, got `{status}`"
        );

        Ok(user_cards(&self.client, &html)?)
    }

    async fn listed_warbles(&self, path: &str) -> Result<Vec<Warble>, UserError> {
        let (status, html) = self.client.get_page(path).await?;

        assumption!(
            status.is_success(),
            "listing page `{path}` should respond with success, got `{status}`"
        );

        let link = Selector::parse("#messages a[href^='/messages/']")
            .assumption("message link selector should parse")?;

        let mut warbles = Vec::new();

        for anchor in html.select(&link) {
            let href = anchor
                .attr("href")
                .assumption("message link should have an `href`")?;

            let id = warble_id_from_path(href)
                .assumption(format!("`{href}` should be a `/messages/{{id}}` path"))?;

            warbles.push(Warble::untracked(&self.client, id));
        }

        Ok(warbles)
    }
}

/// A pending incoming follow request, as listed on the notifications page.
///
/// Produced by [`Client::notifications`](crate::Client::notifications) for
/// accounts marked private. Accepting makes the sender a follower; declining
/// discards the request. Both consume the handle, since the request is gone
/// from the instance either way.
pub struct FollowRequest {
    client: Client,
    from: User,
}

impl fmt::Debug for FollowRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FollowRequest")
            // omitting `client`
            .field("from", &self.from)
            .finish()
    }
}

impl FollowRequest {
    pub(crate) fn new(client: &Client, sender: u32) -> Self {
        Self {
            client: client.clone(),
            from: User::untracked(client, sender),
        }
    }

    /// The account asking to follow the session's user.
    #[inline]
    #[must_use]
    pub fn from(&self) -> &User {
        &self.from
    }

    /// Accepts the request; the sender becomes a follower.
    pub async fn accept(self) -> Result<(), FollowRequestError> {
        self.client.accept_request(self.from.id).await
    }

    /// Declines the request. The sender is not notified.
    pub async fn decline(self) -> Result<(), FollowRequestError> {
        self.client.decline_request(self.from.id).await
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn follow_request_should_name_its_sender() {
        let client = Client::new();

        let request = FollowRequest::new(&client, 7);

        assert_eq!(7, request.from().id());
    }
}
