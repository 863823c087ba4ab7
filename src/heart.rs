//! The like toggle: a heart icon's state plus the page-level like counter.

use crate::{
    errors::LikeError,
    meta::{LikeState, Page},
    warble::Warble,
};

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// An error that can occur when reading a like count off a page.
#[derive(Debug, Error)]
#[error("`{0}` is not a like count, expected a decimal integer")]
pub struct ParseLikeCountError(String);

/// The page-level likes counter: how many warbles the current user has liked.
///
/// On the instance this renders as the `Likes` stat in the profile sidebar.
/// It tracks likes *given* by the user, which is why toggling any heart on
/// the root/listing page moves it by one.
#[derive(
    Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct LikeCount(u32);

impl LikeCount {
    /// Returns the count as a plain integer.
    #[inline]
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns the count adjusted for a heart landing on `state`.
    ///
    /// Landing on [`Liked`](LikeState::Liked) means a like was just given,
    /// so the count goes up by one; landing on [`NotLiked`](LikeState::NotLiked)
    /// means one was taken back. An already-zero count stays at zero rather
    /// than wrapping.
    #[inline]
    #[must_use]
    pub fn apply(self, state: LikeState) -> Self {
        match state {
            LikeState::Liked => Self(self.0.saturating_add(1)),
            LikeState::NotLiked => Self(self.0.saturating_sub(1)),
        }
    }
}

impl From<u32> for LikeCount {
    #[inline]
    fn from(count: u32) -> Self {
        Self(count)
    }
}

impl fmt::Display for LikeCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LikeCount {
    type Err = ParseLikeCountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();

        text.parse::<u32>()
            .map(Self)
            .map_err(|_err| ParseLikeCountError(text.to_owned()))
    }
}

/// One heart icon: a warble's like toggle as seen from a particular page.
///
/// A `Heart` binds together the three things a click touches: the warble the
/// toggle is for, the icon's current visual state, and the page the icon sits
/// on. The last one decides whether the page-level [`LikeCount`] moves — only
/// hearts on the root/listing page carry the counter side effect.
///
/// # Example
///
/// ```no_run
/// # use warbler::{Client, errors::Error};
/// # #[tokio::main]
/// # async fn main() -> Result<(), Error> {
/// let client = Client::with_session("session");
/// let mut timeline = client.timeline().await?;
///
/// let mut heart = match timeline.entries().first() {
///     Some(entry) => entry.heart(),
///     None => return Ok(()),
/// };
///
/// // Toggles the like server-side, then flips the icon and moves the counter.
/// let state = heart.click(timeline.likes_mut()).await?;
/// println!("heart now renders as `{}`", state.css_class());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Heart {
    warble: Warble,
    state: LikeState,
    viewed_from: Page,
}

impl Heart {
    pub(crate) fn new(warble: Warble, state: LikeState, viewed_from: Page) -> Self {
        Self {
            warble,
            state,
            viewed_from,
        }
    }

    /// Returns the warble this heart toggles likes on.
    #[inline]
    #[must_use]
    pub fn warble(&self) -> &Warble {
        &self.warble
    }

    /// Returns the icon's current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> LikeState {
        self.state
    }

    /// Returns the Font Awesome style class the icon currently renders with.
    #[inline]
    #[must_use]
    pub fn css_class(&self) -> &'static str {
        self.state.css_class()
    }

    /// Returns the page this heart is viewed from.
    #[inline]
    #[must_use]
    pub fn viewed_from(&self) -> Page {
        self.viewed_from
    }

    /// Clicks the heart: toggles the like server-side, then updates the view.
    ///
    /// The visual flip happens only once the server has accepted the toggle.
    /// If the request fails — the session went stale, the warble is the
    /// user's own, the instance is unreachable — the icon state and the
    /// counter are left exactly as they were, so the view never drifts from
    /// what the server holds.
    ///
    /// Pass the page-level counter when there is one; it moves by one in the
    /// direction of the toggle, and only when the heart is viewed from the
    /// root/listing page. Returns the state the icon landed on.
    pub async fn click(
        &mut self,
        counter: Option<&mut LikeCount>,
    ) -> Result<LikeState, LikeError> {
        self.warble.toggle_like().await?;
        Ok(self.flip(counter))
    }

    /// Flips the icon without talking to the server.
    ///
    /// This is the pure view-side half of [`click`](Heart::click), for when
    /// the toggle is already known to have happened (another view issued it,
    /// or the toggle was observed out-of-band) and the icon just needs to
    /// catch up. The counter moves under the same root-page-only rule.
    pub fn flip(&mut self, counter: Option<&mut LikeCount>) -> LikeState {
        self.state = self.state.toggled();

        if self.viewed_from.is_home() {
            if let Some(counter) = counter {
                *counter = counter.apply(self.state);
            }
        }

        self.state
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Client;
    use pretty_assertions::assert_eq;

    fn heart(state: LikeState, viewed_from: Page) -> Heart {
        let client = Client::new();

        let warble = client
            .warble_from_url("http://localhost:5000/messages/42")
            .unwrap();

        warble.heart(state, viewed_from)
    }

    #[test]
    fn should_parse_like_count() -> Result<(), ParseLikeCountError> {
        assert_eq!(LikeCount::from(12), "12".parse()?);
        assert_eq!(LikeCount::from(7), "  7 ".parse()?);
        assert_eq!("13", LikeCount::from(13).to_string());
        Ok(())
    }

    #[test]
    fn should_reject_non_numeric_like_count() {
        assert!("".parse::<LikeCount>().is_err());
        assert!("a dozen".parse::<LikeCount>().is_err());
        assert!("-1".parse::<LikeCount>().is_err());
    }

    #[test]
    fn flip_should_fill_outline_heart_and_increment() {
        let mut heart = heart(LikeState::NotLiked, Page::Home);
        let mut count = LikeCount::from(12);

        let state = heart.flip(Some(&mut count));

        assert_eq!(LikeState::Liked, state);
        assert_eq!("fas", heart.css_class());
        assert_eq!(LikeCount::from(13), count);
    }

    #[test]
    fn flip_should_outline_filled_heart_and_decrement() {
        let mut heart = heart(LikeState::Liked, Page::Home);
        let mut count = LikeCount::from(13);

        let state = heart.flip(Some(&mut count));

        assert_eq!(LikeState::NotLiked, state);
        assert_eq!("far", heart.css_class());
        assert_eq!(LikeCount::from(12), count);
    }

    #[test]
    fn double_flip_should_restore_state_and_count() {
        let mut heart = heart(LikeState::NotLiked, Page::Home);
        let mut count = LikeCount::from(12);

        heart.flip(Some(&mut count));
        let state = heart.flip(Some(&mut count));

        assert_eq!(LikeState::NotLiked, state);
        assert_eq!(LikeCount::from(12), count);
    }

    #[test]
    fn counter_should_only_move_on_home_page() {
        for viewed_from in [Page::Warble(42.into()), Page::Other] {
            let mut heart = heart(LikeState::NotLiked, viewed_from);
            let mut count = LikeCount::from(12);

            let state = heart.flip(Some(&mut count));

            // The icon still flips everywhere; only the counter is scoped.
            assert_eq!(LikeState::Liked, state);
            assert_eq!(LikeCount::from(12), count);
        }
    }

    #[tokio::test]
    async fn failed_click_should_leave_view_untouched() {
        use crate::errors::LikeError;

        // The helper's client carries no session, so the click is refused
        // before any request leaves the machine.
        let mut heart = heart(LikeState::NotLiked, Page::Home);
        let mut count = LikeCount::from(12);

        let err = heart.click(Some(&mut count)).await.unwrap_err();

        assert!(matches!(err, LikeError::NoSessionProvided));
        assert_eq!(LikeState::NotLiked, heart.state());
        assert_eq!("far", heart.css_class());
        assert_eq!(LikeCount::from(12), count);
    }

    #[test]
    fn counter_should_not_wrap_below_zero() {
        let mut heart = heart(LikeState::Liked, Page::Home);
        let mut count = LikeCount::from(0);

        heart.flip(Some(&mut count));

        assert_eq!(LikeCount::from(0), count);
    }
}
