//! The home timeline: the root/listing page of a Warbler instance.

use crate::{
    client::Client,
    errors::TimelineError,
    heart::{Heart, LikeCount},
    meta::{LikeState, Page, WarbleId},
    stdx::error::Assume,
    warble::Warble,
};

use scraper::{Html, Selector};

/// The home timeline as one fetch of `/` saw it.
///
/// Holds the listed warbles together with the singular page-level like
/// counter. The counter belongs to the page, not to any entry: clicking a
/// heart on this page moves it by one, which is why [`Heart::click`] takes it
/// via [`likes_mut`](Timeline::likes_mut).
#[derive(Debug)]
pub struct Timeline {
    entries: Vec<Entry>,
    likes: Option<LikeCount>,
}

impl Timeline {
    /// Returns the listed warbles, newest first, as the server ordered them.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Returns the page-level like counter, if the page rendered one.
    #[inline]
    #[must_use]
    pub fn likes(&self) -> Option<LikeCount> {
        self.likes
    }

    /// Mutable access to the page-level like counter, shaped for handing to
    /// [`Heart::click`].
    #[inline]
    #[must_use]
    pub fn likes_mut(&mut self) -> Option<&mut LikeCount> {
        self.likes.as_mut()
    }
}

/// One warble as listed on the timeline.
#[derive(Debug)]
pub struct Entry {
    warble: Warble,
    poster: String,
    text: String,
    state: LikeState,
}

impl Entry {
    /// Returns a handle to the listed warble.
    #[inline]
    #[must_use]
    pub fn warble(&self) -> &Warble {
        &self.warble
    }

    /// Returns the username of the account that posted the warble.
    #[inline]
    #[must_use]
    pub fn poster(&self) -> &str {
        &self.poster
    }

    /// Returns the message text.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the heart icon state this entry was listed with.
    #[inline]
    #[must_use]
    pub fn state(&self) -> LikeState {
        self.state
    }

    /// Mints a [`Heart`] for this entry, scoped to the root/listing page.
    ///
    /// The heart starts in the state the entry was listed with, and since it
    /// is viewed from the timeline, clicking it moves the page-level counter.
    #[must_use]
    pub fn heart(&self) -> Heart {
        self.warble.heart(self.state, Page::Home)
    }
}

pub(crate) fn parse(client: &Client, html: &Html) -> Result<Timeline, TimelineError> {
    let item = Selector::parse("#messages li.list-group-item")
        .assumption("timeline entry selector should parse")?;
    let heart =
        Selector::parse("i.fa-heart").assumption("heart icon selector should parse")?;
    let poster =
        Selector::parse("a[href^='/users/']").assumption("poster link selector should parse")?;
    let text = Selector::parse("p").assumption("message text selector should parse")?;
    let counter =
        Selector::parse(".stat-likes").assumption("like counter selector should parse")?;

    let mut entries = Vec::new();

    for entry in html.select(&item) {
        let icon = entry
            .select(&heart)
            .next()
            .assumption("timeline entry should render a heart icon")?;

        // The `data-msgid` attribute is the contract between the markup and
        // the click handler; a listed entry without one is unusable.
        let raw = icon
            .attr("data-msgid")
            .assumption("heart icon should carry a `data-msgid` attribute")?;

        let id = raw
            .parse::<WarbleId>()
            .assumption(format!("`{raw}` should be a numeric `data-msgid`"))?;

        let state = LikeState::from_classes(icon.value().classes())
            .assumption(format!("heart icon for warble `{id}` should render exactly one of `fas`/`far`"))?;

        let poster = entry
            .select(&poster)
            .next()
            .assumption(format!("timeline entry for warble `{id}` should link to its poster"))?
            .text()
            .collect::<String>()
            .trim()
            .trim_start_matches('@')
            .to_owned();

        let text = entry
            .select(&text)
            .next()
            .assumption(format!("timeline entry for warble `{id}` should render its text"))?
            .text()
            .collect::<String>()
            .trim()
            .to_owned();

        entries.push(Entry {
            warble: Warble::untracked(client, id),
            poster,
            text,
            state,
        });
    }

    // The counter lives in the profile sidebar, outside any entry. An
    // instance might not render one (no sidebar variant), so its absence is
    // tolerated rather than assumed against.
    let likes = match html.select(&counter).next() {
        Some(stat) => Some(
            stat.text()
                .collect::<String>()
                .parse::<LikeCount>()
                .assumption("page-level like counter should be a decimal integer")?,
        ),
        None => None,
    };

    Ok(Timeline { entries, likes })
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    const HOME: &str = r#"
        <aside>
            <a href="/users/3/likes">
                <span class="small">Likes</span>
                <h4><span class="stat-likes">12</span></h4>
            </a>
        </aside>
        <ul class="list-group" id="messages">
            <li class="list-group-item">
                <a href="/users/7"><span>@tuckerdiane</span></a>
                <span class="text-muted">14 August 2026</span>
                <p>Work suggest treat bad threat direction.</p>
                <button class="btn message-heart">
                    <i class="far fa-heart" data-msgid="42"></i>
                </button>
            </li>
            <li class="list-group-item">
                <a href="/users/9"><span>@wknight</span></a>
                <span class="text-muted">13 August 2026</span>
                <p>Least position meet world economy.</p>
                <button class="btn message-heart">
                    <i class="fas fa-heart" data-msgid="41"></i>
                </button>
            </li>
        </ul>"#;

    #[test]
    fn should_parse_home_timeline() -> Result<(), TimelineError> {
        let client = Client::new();
        let html = Html::parse_document(HOME);

        let timeline = parse(&client, &html)?;

        assert_eq!(Some(LikeCount::from(12)), timeline.likes());
        assert_eq!(2, timeline.entries().len());

        let first = &timeline.entries()[0];
        assert_eq!(WarbleId::from(42), first.warble().id());
        assert_eq!("tuckerdiane", first.poster());
        assert_eq!("Work suggest treat bad threat direction.", first.text());
        assert_eq!(LikeState::NotLiked, first.state());

        let second = &timeline.entries()[1];
        assert_eq!(WarbleId::from(41), second.warble().id());
        assert_eq!(LikeState::Liked, second.state());

        Ok(())
    }

    #[test]
    fn entry_heart_should_be_scoped_to_home() -> Result<(), TimelineError> {
        let client = Client::new();
        let html = Html::parse_document(HOME);

        let mut timeline = parse(&client, &html)?;

        let mut heart = match timeline.entries().first() {
            Some(entry) => entry.heart(),
            None => unreachable!("fixture lists two entries"),
        };

        assert_eq!(Page::Home, heart.viewed_from());

        // Clicking from the timeline moves the page-level counter.
        let state = heart.flip(timeline.likes_mut());
        assert_eq!(LikeState::Liked, state);
        assert_eq!(Some(LikeCount::from(13)), timeline.likes());

        Ok(())
    }

    #[test]
    fn should_tolerate_missing_counter() -> Result<(), TimelineError> {
        let client = Client::new();
        let html = Html::parse_document(
            r#"<ul class="list-group" id="messages">
                <li class="list-group-item">
                    <a href="/users/7">@tuckerdiane</a>
                    <p>Work suggest treat bad threat direction.</p>
                    <i class="far fa-heart" data-msgid="42"></i>
                </li>
            </ul>"#,
        );

        let timeline = parse(&client, &html)?;

        assert_eq!(None, timeline.likes());
        assert_eq!(1, timeline.entries().len());

        Ok(())
    }
}
