//! Scraping for the `/messages/{id}` detail page.

use crate::{
    heart::LikeCount,
    stdx::error::{Assume, Assumption},
};

use chrono::NaiveDate;
use scraper::{Html, Selector};

/// Parsed contents of one warble's detail page.
#[derive(Debug, Clone)]
pub(super) struct Detail {
    pub(super) text: String,
    pub(super) poster: String,
    pub(super) posted_on: NaiveDate,
    pub(super) likes: LikeCount,
}

/// Parses a detail page, returning `None` when the document is not a message
/// page at all (the instance serves its not-found page with a `200`).
pub(super) fn parse(html: &Html) -> Result<Option<Detail>, Assumption> {
    let message = Selector::parse("p.single-message").assumption("message selector should parse")?;

    let Some(message) = html.select(&message).next() else {
        return Ok(None);
    };

    let text = message.text().collect::<String>().trim().to_owned();

    let poster = Selector::parse("a[href^='/users/']").assumption("poster selector should parse")?;

    let poster = html
        .select(&poster)
        .next()
        .assumption("detail page should link to the poster's profile")?
        .text()
        .collect::<String>()
        .trim()
        .trim_start_matches('@')
        .to_owned();

    let timestamp =
        Selector::parse("span.text-muted").assumption("timestamp selector should parse")?;

    let timestamp = html
        .select(&timestamp)
        .next()
        .assumption("detail page should render the post timestamp")?
        .text()
        .collect::<String>();

    let posted_on = NaiveDate::parse_from_str(timestamp.trim(), "%d %B %Y").assumption(format!(
        "`{}` should be a `{{day}} {{month name}} {{year}}` timestamp",
        timestamp.trim()
    ))?;

    let counter = Selector::parse(".stat-likes").assumption("like counter selector should parse")?;

    let likes = html
        .select(&counter)
        .next()
        .assumption("detail page should render its like counter")?
        .text()
        .collect::<String>()
        .parse::<LikeCount>()
        .assumption("like counter should be a decimal integer")?;

    Ok(Some(Detail {
        text,
        poster,
        posted_on,
        likes,
    }))
}
