//! Scraping for the `/users/{id}` profile page.

use crate::{
    heart::LikeCount,
    stdx::error::{Assume, Assumption},
};

use scraper::{Html, Selector};

/// Parsed contents of one account's profile page.
#[derive(Debug, Clone)]
pub(super) struct Profile {
    pub(super) username: String,
    pub(super) bio: Option<String>,
    pub(super) location: Option<String>,
    pub(super) stats: Stats,
}

/// The stat row of a profile sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// How many warbles the account has posted.
    pub warbles: u32,
    /// How many accounts this account follows.
    pub following: u32,
    /// How many accounts follow this account.
    pub followers: u32,
    /// How many warbles this account has liked. This is the same number the
    /// root/listing page renders as its page-level counter.
    pub likes: LikeCount,
}

/// Parses a profile page, returning `None` when the document is not a profile
/// at all (the instance serves its not-found page with a `200`).
pub(super) fn parse(html: &Html) -> Result<Option<Profile>, Assumption> {
    let username =
        Selector::parse("h4#sidebar-username").assumption("username selector should parse")?;

    let Some(username) = html.select(&username).next() else {
        return Ok(None);
    };

    let username = username
        .text()
        .collect::<String>()
        .trim()
        .trim_start_matches('@')
        .to_owned();

    let bio = Selector::parse("p.user-bio").assumption("bio selector should parse")?;

    let bio = html
        .select(&bio)
        .next()
        .map(|bio| bio.text().collect::<String>().trim().to_owned())
        .filter(|bio| !bio.is_empty());

    let location =
        Selector::parse("p.user-location").assumption("location selector should parse")?;

    let location = html
        .select(&location)
        .next()
        .map(|location| location.text().collect::<String>().trim().to_owned())
        .filter(|location| !location.is_empty());

    let stat = Selector::parse("ul.user-stats a[href]").assumption("stat selector should parse")?;

    let mut warbles = None;
    let mut following = None;
    let mut followers = None;
    let mut likes = None;

    for anchor in html.select(&stat) {
        let href = anchor
            .attr("href")
            .assumption("stat anchor should have an `href`")?;

        let count = anchor.text().collect::<String>();
        let count = count
            .trim()
            .parse::<u32>()
            .assumption(format!("stat for `{href}` should be a decimal integer"))?;

        if href.ends_with("/following") {
            following = Some(count);
        } else if href.ends_with("/followers") {
            followers = Some(count);
        } else if href.ends_with("/likes") {
            likes = Some(LikeCount::from(count));
        } else {
            warbles = Some(count);
        }
    }

    let stats = Stats {
        warbles: warbles.assumption("profile should render a messages stat")?,
        following: following.assumption("profile should render a following stat")?,
        followers: followers.assumption("profile should render a followers stat")?,
        likes: likes.assumption("profile should render a likes stat")?,
    };

    Ok(Some(Profile {
        username,
        bio,
        location,
        stats,
    }))
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    const PROFILE: &str = r#"
        <aside>
            <h4 id="sidebar-username">@tuckerdiane</h4>
            <p class="user-location"><span class="fa fa-map-marker"></span> Port Joshua</p>
            <p class="user-bio">Himself section recently drop dead.</p>
        </aside>
        <ul class="user-stats nav nav-pills">
            <li class="stat"><p class="small">Messages</p><h4><a href="/users/7">34</a></h4></li>
            <li class="stat"><p class="small">Following</p><h4><a href="/users/7/following">18</a></h4></li>
            <li class="stat"><p class="small">Followers</p><h4><a href="/users/7/followers">21</a></h4></li>
            <li class="stat"><p class="small">Likes</p><h4><a href="/users/7/likes">12</a></h4></li>
        </ul>"#;

    #[test]
    fn should_parse_profile_page() -> Result<(), Assumption> {
        let html = Html::parse_document(PROFILE);

        let profile = parse(&html)?.assumption("fixture should parse as a profile")?;

        assert_eq!("tuckerdiane", profile.username);
        assert_eq!(Some("Port Joshua".to_owned()), profile.location);
        assert_eq!(
            Some("Himself section recently drop dead.".to_owned()),
            profile.bio
        );
        assert_eq!(
            Stats {
                warbles: 34,
                following: 18,
                followers: 21,
                likes: LikeCount::from(12),
            },
            profile.stats
        );

        Ok(())
    }

    #[test]
    fn should_not_mistake_not_found_page_for_profile() -> Result<(), Assumption> {
        let html = Html::parse_document(r#"<h1>What you were looking for doesn't exist :(</h1>"#);
        assert!(parse(&html)?.is_none());
        Ok(())
    }
}
