//! Flows against a live Warbler instance.
//!
//! These need a checkout of the site running locally (`flask run` with the
//! seeded database) and are therefore ignored by default. Run them with:
//!
//! ```sh
//! WARBLER_SESSION=<session cookie> cargo test -- --ignored
//! ```

use warbler::{Client, LikeState, errors::Error};

fn client() -> Client {
    match std::env::var("WARBLER_SESSION") {
        Ok(session) if !session.is_empty() => Client::with_session(&session),
        _ => Client::new(),
    }
}

#[tokio::test]
#[ignore = "requires a running warbler instance"]
async fn timeline() -> Result<(), Error> {
    let client = client();

    let timeline = client.timeline().await?;

    for entry in timeline.entries() {
        assert!(!entry.poster().is_empty(), "entry should name its poster");
        let _state = entry.state();
    }

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running warbler instance"]
async fn like_toggle_roundtrip() -> Result<(), Error> {
    let client = client();

    let mut timeline = client.timeline().await?;
    let before = timeline.likes();

    let mut heart = match timeline.entries().first() {
        Some(entry) => entry.heart(),
        None => panic!("seeded timeline should not be empty"),
    };

    let started = heart.state();

    let flipped = heart.click(timeline.likes_mut()).await?;
    assert_eq!(started.toggled(), flipped);

    // Toggle back so the run leaves the instance as it found it.
    let restored = heart.click(timeline.likes_mut()).await?;
    assert_eq!(started, restored);
    assert_eq!(before, timeline.likes());

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running warbler instance"]
async fn own_warble_cannot_be_liked() -> anyhow::Result<()> {
    let client = client();

    client.post_warble("testing my own heart").await?;

    let me = client
        .users(Some("testuser"))
        .await?
        .into_iter()
        .next()
        .expect("the session user should be listed");

    let own = me
        .warbles()
        .await?
        .into_iter()
        .next()
        .expect("just posted, so the list cannot be empty");

    let mut heart = own.heart(LikeState::NotLiked, warbler::Page::Home);
    let err = heart.click(None).await.unwrap_err();

    assert!(matches!(err, warbler::errors::LikeError::OwnWarble));
    // A refused click leaves the view exactly as it was.
    assert_eq!(LikeState::NotLiked, heart.state());

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running warbler instance"]
async fn warble() -> Result<(), Error> {
    let client = client();

    let warble = match client.warble(1u32).await? {
        Some(warble) => warble,
        None => return Ok(()),
    };

    let _text = warble.text().await?;
    let _poster = warble.poster().await?;
    let _posted_on = warble.posted_on().await?;
    let _likes = warble.likes().await?;

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running warbler instance"]
async fn user_and_follow() -> anyhow::Result<()> {
    let client = client();

    let user = client
        .user(1)
        .await?
        .expect("seeded database should have user 1");

    let username = user.username().await?;
    assert!(!username.is_empty());

    let _stats = user.stats().await?;
    let _warbles = user.warbles().await?;
    let _liked = user.liked().await?;

    if client.has_session() {
        user.follow().await?;
        user.unfollow().await?;
    }

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running warbler instance"]
async fn follow_lists_and_notifications() -> anyhow::Result<()> {
    let client = client();

    let user = client
        .user(1)
        .await?
        .expect("seeded database should have user 1");

    // Private accounts hide their lists from strangers; both outcomes are
    // valid depending on who the session belongs to.
    match user.following().await {
        Ok(following) => {
            for account in &following {
                assert!(account.id() > 0);
            }
        }
        Err(warbler::errors::FollowingError::NotAuthorized) => {}
        Err(err) => return Err(err.into()),
    }

    match user.followers().await {
        Ok(followers) => {
            for account in &followers {
                assert!(account.id() > 0);
            }
        }
        Err(warbler::errors::FollowingError::NotAuthorized) => {}
        Err(err) => return Err(err.into()),
    }

    if client.has_session() {
        for request in client.notifications().await? {
            assert!(request.from().id() > 0);
        }
    }

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running warbler instance"]
async fn login_rejects_bad_credentials() -> anyhow::Result<()> {
    let client = Client::new();

    let err = client
        .login("no-such-user", "wrong-password")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        warbler::errors::LoginError::InvalidCredentials
    ));

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running warbler instance"]
async fn stale_session_is_detected() -> Result<(), Error> {
    let client = Client::with_session("not-a-real-session");

    assert!(!client.has_valid_session().await?);

    Ok(())
}
