//! Identifier and view-state vocabulary for a Warbler instance.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// An error that can occur when parsing a warble id from markup.
///
/// The id comes from the `data-msgid` attribute of a heart icon, which is an
/// external collaborator contract. An absent or mangled attribute means the
/// markup is misconfigured, and must never turn into a request for
/// `/messages/undefined/likes`.
#[derive(Debug, Error)]
pub enum ParseWarbleIdError {
    /// The attribute was present but empty.
    #[error("warble id token is empty")]
    Empty,
    /// The token was not a decimal integer.
    #[error("`{0}` is not a valid warble id, expected a decimal integer")]
    NotANumber(String),
}

/// Identifies one warble (message) on a Warbler instance.
///
/// Ids are assigned server-side and are opaque to this library beyond being
/// decimal integers. They appear in `/messages/{id}` paths and in the
/// `data-msgid` attribute of heart icons.
#[derive(
    Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct WarbleId(u32);

impl WarbleId {
    /// Returns the id as the integer the server assigned.
    #[inline]
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for WarbleId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for WarbleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WarbleId {
    type Err = ParseWarbleIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();

        if token.is_empty() {
            return Err(ParseWarbleIdError::Empty);
        }

        token
            .parse::<u32>()
            .map(Self)
            .map_err(|_err| ParseWarbleIdError::NotANumber(token.to_owned()))
    }
}

/// An error that can occur when reading a like state out of a class list.
#[derive(Debug, Error)]
pub enum ParseLikeStateError {
    /// The class was neither `fas` (filled) nor `far` (outline).
    #[error("`{0}` is not a like state class, expected one of `fas` or `far`")]
    UnknownClass(String),
    /// The class list carried both `fas` and `far` at once.
    #[error("heart icon carries both `fas` and `far`, classes must be mutually exclusive")]
    BothClasses,
    /// The class list carried neither `fas` nor `far`.
    #[error("heart icon carries neither `fas` nor `far`")]
    NeitherClass,
}

/// The like state of one warble, as seen by the current user.
///
/// This is the source of truth the heart icon's CSS classes project from:
/// `fas` renders the filled heart for [`Liked`](LikeState::Liked), `far` the
/// outline for [`NotLiked`](LikeState::NotLiked). The pair is mutually
/// exclusive; [`from_classes`](LikeState::from_classes) enforces that when
/// reading state back out of markup.
#[derive(
    Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum LikeState {
    /// The current user has liked the warble. Rendered as a filled heart.
    Liked,
    /// The current user has not liked the warble. Rendered as an outline.
    #[default]
    NotLiked,
}

impl LikeState {
    /// Returns the state a toggle lands on.
    #[inline]
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Liked => Self::NotLiked,
            Self::NotLiked => Self::Liked,
        }
    }

    /// Converts a [`LikeState`] into the Font Awesome style class it renders
    /// as: `fas` for filled, `far` for outline.
    #[inline]
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Liked => "fas",
            Self::NotLiked => "far",
        }
    }

    /// Reads a like state from a single class token.
    pub fn from_class(class: &str) -> Result<Self, ParseLikeStateError> {
        match class {
            "fas" => Ok(Self::Liked),
            "far" => Ok(Self::NotLiked),
            other => Err(ParseLikeStateError::UnknownClass(other.to_owned())),
        }
    }

    /// Reads a like state from a full class list.
    ///
    /// Exactly one of `fas`/`far` must be present; anything else violates
    /// the markup contract and is reported rather than guessed at.
    pub fn from_classes<'a>(
        classes: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, ParseLikeStateError> {
        let mut found = None;

        for class in classes {
            let state = match class {
                "fas" => Self::Liked,
                "far" => Self::NotLiked,
                _ => continue,
            };

            match found {
                None => found = Some(state),
                Some(prev) if prev != state => return Err(ParseLikeStateError::BothClasses),
                Some(_) => {}
            }
        }

        found.ok_or(ParseLikeStateError::NeitherClass)
    }
}

/// Where on the instance the current view lives.
///
/// The like counter side effect is scoped to the root/listing page: toggling
/// a heart moves the page-level counter on [`Home`](Page::Home) and nowhere
/// else, even when a counter element happens to exist. The message detail
/// page maintains its own count server-side.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum Page {
    /// The root/listing page at `/`.
    Home,
    /// A message detail page at `/messages/{id}`.
    Warble(WarbleId),
    /// Any other path on the instance.
    #[default]
    Other,
}

impl Page {
    /// Classifies a navigation path.
    ///
    /// Only the exact root path counts as [`Home`](Page::Home); `/messages/{id}`
    /// with a well-formed id counts as that warble's detail page. Everything
    /// else, including malformed detail paths, is [`Other`](Page::Other).
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        if path == "/" {
            return Self::Home;
        }

        if let Some(rest) = path.strip_prefix("/messages/") {
            if let Ok(id) = rest.parse::<WarbleId>() {
                return Self::Warble(id);
            }
        }

        Self::Other
    }

    /// Returns whether this is the root/listing page.
    #[inline]
    #[must_use]
    pub fn is_home(self) -> bool {
        matches!(self, Self::Home)
    }
}
