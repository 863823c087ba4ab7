//! Represents a client abstraction for a Warbler instance.

use crate::{
    errors::{
        ClientBuilderError, ClientError, FollowError, FollowRequestError, InvalidWarbleUrl,
        LikeError, LoginError, NotificationsError, PostError, RequestError, SessionError,
        SignupError, TimelineError, UserError, WarbleError,
    },
    meta::WarbleId,
    stdx::{
        error::{Assume, assumption},
        http::{DEFAULT_USER_AGENT, IRetry},
    },
    timeline::{self, Timeline},
    user::{FollowRequest, User},
    warble::Warble,
};

use regex::Regex;
use reqwest::{StatusCode, header, redirect::Policy};
use scraper::{Html, Selector};
use std::{
    collections::HashMap,
    fmt::Display,
    str::FromStr,
    sync::{Arc, LazyLock},
};
use url::Url;

/// Address a Warbler checkout serves on under the Flask dev server.
const DEFAULT_BASE: &str = "http://localhost:5000/";

/// A builder for configuring and creating instances of [`Client`] with custom settings.
///
/// The `ClientBuilder` provides an API for fine-tuning various aspects of the
/// `Client` configuration: the instance's base URL, the session cookie, and
/// custom user agents. It enables a more controlled construction of the
/// `Client` when the default configuration isn't sufficient.
///
/// # Example
///
/// ```
/// # use warbler::ClientBuilder;
/// let client = ClientBuilder::new()
///     .user_agent("custom-agent/1.0")
///     .build()?;
/// # Ok::<(), warbler::errors::ClientBuilderError>(())
/// ```
#[derive(Debug)]
pub struct ClientBuilder {
    builder: reqwest::ClientBuilder,
    base: Url,
    session: Session,
}

impl Default for ClientBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    ///
    /// This includes a default user agent (`$CARGO_PKG_NAME/$CARGO_PKG_VERSION`)
    /// and the default instance address of `http://localhost:5000`.
    ///
    /// Redirects are never followed automatically: the Warbler server answers
    /// every mutation with a redirect whose target carries the outcome as a
    /// flash message, so the client must see the redirect itself.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        let builder = reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .redirect(Policy::none())
            .brotli(true);

        #[expect(
            clippy::expect_used,
            reason = "the default base address is a known-valid literal"
        )]
        let base = Url::parse(DEFAULT_BASE).expect("default base address should parse");

        Self {
            builder,
            base,
            session: Session::default(),
        }
    }

    /// Points the `Client` at a Warbler instance other than `http://localhost:5000`.
    ///
    /// Routes are joined onto the URL as given, so it should end with a
    /// trailing slash (URL parsing adds one automatically for a bare host).
    ///
    /// # Example
    ///
    /// ```
    /// # use warbler::ClientBuilder;
    /// # use url::Url;
    /// let builder = ClientBuilder::new()
    ///     .base_url(Url::parse("https://warbler.example.org/").unwrap());
    /// ```
    #[inline]
    #[must_use]
    pub fn base_url(mut self, base: Url) -> Self {
        self.base = base;
        self
    }

    /// Configures the `ClientBuilder` to use the specified session cookie for
    /// authentication.
    ///
    /// The value is what the instance set as the `session` cookie after a
    /// login. It will be included in all subsequent requests made by the
    /// resulting `Client`, where needed. To obtain one programmatically, see
    /// [`Client::login`].
    #[inline]
    #[must_use]
    pub fn with_session(mut self, session: &str) -> Self {
        self.session = Session::new(session);
        self
    }

    /// Sets a custom `User-Agent` header for the [`Client`].
    #[inline]
    #[must_use]
    pub fn user_agent(self, user_agent: &str) -> Self {
        let builder = self.builder.user_agent(user_agent);
        Self { builder, ..self }
    }

    /// Consumes the `ClientBuilder` and returns a fully-configured [`Client`].
    ///
    /// # Errors
    ///
    /// Returns a [`ClientBuilderError`] if the underlying HTTP client could
    /// not be built, such as when TLS initialization fails or the DNS
    /// resolver cannot load the system configuration.
    #[inline]
    pub fn build(self) -> Result<Client, ClientBuilderError> {
        Ok(Client {
            http: self
                .builder
                .build()
                .map_err(|_err| ClientBuilderError::BuildFailed)?,
            base: self.base,
            session: self.session,
        })
    }
}

/// A high-level, asynchronous client to interact with a Warbler instance.
///
/// The `Client` is designed for efficient, reusable interactions, and
/// internally manages connection pooling. Handles minted from it
/// ([`Warble`], [`User`]) share the underlying connection pool.
///
/// # Example
///
/// ```
/// # use warbler::Client;
/// let client = Client::new();
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) http: reqwest::Client,
    pub(crate) base: Url,
    pub(crate) session: Session,
}

// Creation impls
impl Client {
    /// Instantiates a new [`Client`] pointed at `http://localhost:5000` with
    /// no session.
    ///
    /// # Panics
    ///
    /// This function will panic if the underlying HTTP client cannot be
    /// initialized. For a safer alternative that returns a `Result` instead
    /// of panicking, consider using the [`ClientBuilder`].
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        #[expect(
            clippy::expect_used,
            reason = "it is documented that this can panic and that `ClientBuilder` should be used instead for a `Result`"
        )]
        ClientBuilder::new().build().expect("Client::new()")
    }

    /// Instantiates a new [`Client`] with a provided session cookie, allowing
    /// authenticated requests.
    ///
    /// # Panics
    ///
    /// This function will panic if the underlying HTTP client cannot be
    /// initialized. For a safer alternative that returns a `Result` instead
    /// of panicking, consider using the [`ClientBuilder`].
    #[inline]
    #[must_use]
    pub fn with_session(session: &str) -> Self {
        #[expect(
            clippy::expect_used,
            reason = "it is documented that this can panic and that `ClientBuilder` should be used instead for a `Result`"
        )]
        ClientBuilder::new()
            .with_session(session)
            .build()
            .expect("Client::with_session()")
    }

    /// Returns a [`ClientBuilder`] for creating a custom-configured `Client`.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }
}

// Public facing impls
impl Client {
    /// Logs in with the given credentials and returns a new `Client` carrying
    /// the fresh session.
    ///
    /// The current client's configuration (base URL, user agent) is reused;
    /// only the session changes. The login form's CSRF token is fetched and
    /// submitted transparently.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use warbler::{Client, errors::Error};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Error> {
    /// let client = Client::new().login("tuckerdiane", "password").await?;
    /// assert!(client.has_session());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn login(&self, username: &str, password: &str) -> Result<Self, LoginError> {
        let url = format!("{}login", self.base);

        let response = self
            .http
            .get(url.clone())
            .retry()
            .send()
            .await
            .map_err(RequestError)?;

        // Flask stores the CSRF token in the anonymous session, so both
        // pieces must come from the same response.
        let anon = cookie(&response);
        let html = Html::parse_document(&response.text().await.map_err(RequestError)?);
        let token = csrf_token(&html)
            .assumption("login page should render a `csrf_token` hidden input")?;

        let form = HashMap::from([
            ("csrf_token", token),
            ("username", username.to_owned()),
            ("password", password.to_owned()),
        ]);

        let mut request = self.http.post(url).form(&form);
        if let Some(anon) = &anon {
            request = request.header(header::COOKIE, format!("session={anon}"));
        }

        let response = request.retry().send().await.map_err(RequestError)?;

        if response.status().is_redirection() {
            let session = cookie(&response)
                .or(anon)
                .assumption("login redirect should carry a `session` cookie")?;

            return Ok(Self {
                http: self.http.clone(),
                base: self.base.clone(),
                session: Session::new(&session),
            });
        }

        let html = Html::parse_document(&response.text().await.map_err(RequestError)?);

        if flashes(&html)?
            .iter()
            .any(|flash| flash.contains("Invalid credentials"))
        {
            return Err(LoginError::InvalidCredentials);
        }

        assumption!(
            "login neither redirected nor re-rendered the form with a known flash; the instance's login flow may have changed"
        )
    }

    /// Creates a new account and returns a `Client` logged in as it.
    ///
    /// `image_url` is optional; the instance substitutes its default avatar
    /// when omitted.
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
        image_url: Option<&str>,
    ) -> Result<Self, SignupError> {
        let url = format!("{}signup", self.base);

        let response = self
            .http
            .get(url.clone())
            .retry()
            .send()
            .await
            .map_err(RequestError)?;

        let anon = cookie(&response);
        let html = Html::parse_document(&response.text().await.map_err(RequestError)?);
        let token = csrf_token(&html)
            .assumption("signup page should render a `csrf_token` hidden input")?;

        let form = HashMap::from([
            ("csrf_token", token),
            ("username", username.to_owned()),
            ("email", email.to_owned()),
            ("password", password.to_owned()),
            ("image_url", image_url.unwrap_or_default().to_owned()),
        ]);

        let mut request = self.http.post(url).form(&form);
        if let Some(anon) = &anon {
            request = request.header(header::COOKIE, format!("session={anon}"));
        }

        let response = request.retry().send().await.map_err(RequestError)?;

        if response.status().is_redirection() {
            let session = cookie(&response)
                .or(anon)
                .assumption("signup redirect should carry a `session` cookie")?;

            return Ok(Self {
                http: self.http.clone(),
                base: self.base.clone(),
                session: Session::new(&session),
            });
        }

        let html = Html::parse_document(&response.text().await.map_err(RequestError)?);

        if flashes(&html)?
            .iter()
            .any(|flash| flash.contains("Username already exists"))
        {
            return Err(SignupError::UsernameTaken);
        }

        assumption!(
            "signup neither redirected nor re-rendered the form with a known flash; the instance's signup flow may have changed"
        )
    }

    /// Logs the session out on the instance and returns a session-less
    /// `Client`.
    ///
    /// The old cookie stops logging in after this; drop it.
    pub async fn logout(&self) -> Result<Self, SessionError> {
        let session = self.session.validate(self).await?;

        let response = self
            .http
            .get(format!("{}logout", self.base))
            .header(header::COOKIE, format!("session={session}"))
            .retry()
            .send()
            .await
            .map_err(RequestError)?;

        if !response.status().is_redirection() {
            assumption!(
                "logout should redirect to the login page, got `{}`",
                response.status()
            );
        }

        Ok(Self {
            http: self.http.clone(),
            base: self.base.clone(),
            session: Session::default(),
        })
    }

    /// Fetches and parses the home timeline.
    ///
    /// The timeline is the root/listing page: the hundred most recent warbles
    /// of followed users, each with its heart icon state, plus the singular
    /// page-level like counter. Requires a valid session — anonymous visitors
    /// get the signup hero instead of a timeline.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use warbler::{Client, errors::Error};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Error> {
    /// let client = Client::with_session("session");
    ///
    /// for entry in client.timeline().await?.entries() {
    ///     println!("@{}: {}", entry.poster(), entry.text());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn timeline(&self) -> Result<Timeline, TimelineError> {
        let Some(session) = self.session.value() else {
            return Err(TimelineError::NoSessionProvided);
        };

        let response = self
            .http
            .get(self.base.clone())
            .header(header::COOKIE, format!("session={session}"))
            .retry()
            .send()
            .await
            .map_err(RequestError)?;

        let html = Html::parse_document(&response.text().await.map_err(RequestError)?);

        if !is_logged_in(&html)? {
            return Err(TimelineError::InvalidSession);
        }

        timeline::parse(self, &html)
    }

    /// Constructs a [`Warble`] for the given `id`, verifying it exists.
    ///
    /// Returns `Ok(None)` when the instance has no such message. The fetched
    /// detail page is cached on the returned handle, so immediate accessor
    /// calls cost no further requests.
    pub async fn warble(&self, id: impl Into<WarbleId>) -> Result<Option<Warble>, WarbleError> {
        Warble::new_with_client(id.into(), self).await
    }

    /// Constructs a [`Warble`] from a given `url` without touching the network.
    ///
    /// The URL must follow the instance's `/messages/{id}` structure. It is
    /// assumed that the warble exists given the URL; accessors will error
    /// later if it does not.
    ///
    /// # Example
    ///
    /// ```
    /// # use warbler::{Client, errors::Error};
    /// # fn main() -> Result<(), Error> {
    /// let client = Client::new();
    /// let warble = client.warble_from_url("http://localhost:5000/messages/42")?;
    /// assert_eq!(42, warble.id().as_u32());
    /// # Ok(())
    /// # }
    /// ```
    pub fn warble_from_url(&self, url: &str) -> Result<Warble, InvalidWarbleUrl> {
        Warble::from_url_with_client(url, self)
    }

    /// Constructs a [`User`] for the given `id`, verifying it exists.
    ///
    /// Returns `Ok(None)` when the instance has no such account.
    pub async fn user(&self, id: u32) -> Result<Option<User>, UserError> {
        User::new_with_client(id, self).await
    }

    /// Lists users, optionally filtered by a username search.
    ///
    /// Mirrors the instance's `/users?q=` search: the query is matched as a
    /// substring of usernames.
    pub async fn users(&self, query: Option<&str>) -> Result<Vec<User>, UserError> {
        let path = match query {
            Some(query) => format!("users?q={}", urlencoding::encode(query)),
            None => "users".to_owned(),
        };

        let (_status, html) = self.get_page(&path).await?;

        Ok(user_cards(self, &html)?)
    }

    /// Lists the pending incoming follow requests of the session's user.
    ///
    /// Private accounts collect follow attempts as requests; they show up on
    /// the instance's notifications page until accepted or declined via the
    /// returned [`FollowRequest`] handles.
    pub async fn notifications(&self) -> Result<Vec<FollowRequest>, NotificationsError> {
        if self.session.value().is_none() {
            return Err(NotificationsError::NoSessionProvided);
        }

        let (status, html) = self.get_page("notifications").await?;

        // Anonymous and stale sessions get bounced off the page.
        if status.is_redirection() {
            return Err(NotificationsError::InvalidSession);
        }

        assumption!(
            status.is_success(),
            "notifications page should respond with success, got `{status}`"
        );

        let form = Selector::parse("form[action^='/requests/accept/']")
            .assumption("accept form selector should parse")?;

        let mut requests = Vec::new();

        for form in html.select(&form) {
            let action = form
                .attr("action")
                .assumption("accept form should have an `action`")?;

            let sender = request_sender_from_path(action)
                .assumption(format!("`{action}` should be a `/requests/accept/{{id}}` path"))?;

            requests.push(FollowRequest::new(self, sender));
        }

        Ok(requests)
    }

    /// Posts a new warble as the session's user.
    ///
    /// # Errors
    ///
    /// Fails with a session error when no (valid) session is configured; the
    /// instance rejects anonymous posting.
    pub async fn post_warble(&self, text: &str) -> Result<(), PostError> {
        let session = self.session.validate(self).await?;

        // The message form is rendered on every page; the home page is as
        // good a source for its CSRF token as any.
        let home = self.get_html(self.base.clone(), Some(&session)).await?;
        let token = csrf_token(&home)
            .assumption("home page should render a `csrf_token` hidden input")?;

        let form = HashMap::from([("csrf_token", token), ("text", text.to_owned())]);

        let response = self
            .http
            .post(format!("{}messages/new", self.base))
            .header(header::COOKIE, format!("session={session}"))
            .form(&form)
            .retry()
            .send()
            .await
            .map_err(RequestError)?;

        if !response.status().is_redirection() {
            assumption!(
                "posting a warble should redirect to the poster's profile, got `{}`",
                response.status()
            );
        }

        self.check_redirect_flashes(&response, &session).await?;

        Ok(())
    }

    /// Returns if the `Client` was provided a session.
    ///
    /// This does **NOT** mean the session is valid.
    #[inline]
    #[must_use]
    pub fn has_session(&self) -> bool {
        !self.session.is_empty()
    }

    /// Tries to validate the current session.
    ///
    /// - `true` if the session is proven valid.
    /// - `false` if the session is proven invalid.
    ///
    /// <div class="warning">
    ///
    /// **This is mainly provided for a quick early return for when the
    /// circumstances allow. Any methods that use a session should not rely on
    /// the session always being valid after this check; The session could be
    /// invalidated after the check completes!**
    ///
    /// </div>
    pub async fn has_valid_session(&self) -> Result<bool, SessionError> {
        match self.session.validate(self).await {
            Ok(_) => Ok(true),
            Err(SessionError::InvalidSession) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

// Internal only impls
impl Client {
    async fn get_html(
        &self,
        url: Url,
        session: Option<&ValidSession>,
    ) -> Result<Html, RequestError> {
        let mut request = self.http.get(url);

        if let Some(session) = session {
            request = request.header(header::COOKIE, format!("session={session}"));
        }

        let response = request.retry().send().await.map_err(RequestError)?;
        let document = response.text().await.map_err(RequestError)?;

        Ok(Html::parse_document(&document))
    }

    /// Fetches a page with the raw (unvalidated) session attached, if any.
    ///
    /// Read paths go through here: the instance serves most pages to
    /// anonymous visitors too, so failing on a missing session would be
    /// overeager.
    pub(crate) async fn get_page(
        &self,
        path: &str,
    ) -> Result<(StatusCode, Html), ClientError> {
        let mut request = self.http.get(format!("{}{path}", self.base));

        if let Some(session) = self.session.value() {
            request = request.header(header::COOKIE, format!("session={session}"));
        }

        let response = request.retry().send().await.map_err(RequestError)?;
        let status = response.status();
        let document = response.text().await.map_err(RequestError)?;

        Ok((status, Html::parse_document(&document)))
    }

    /// Issues the like-toggle request for one warble.
    ///
    /// The server flips like membership itself; this request has no body and
    /// no direction. Outcomes arrive as flash messages on the redirect
    /// target, so success here means "the server accepted the toggle", which
    /// is what the optimistic visual flip is allowed to key off of.
    pub(crate) async fn toggle_like(&self, warble: WarbleId) -> Result<(), LikeError> {
        let session = self.session.validate(self).await?;

        let response = self
            .http
            .post(format!("{}messages/{warble}/likes", self.base))
            .header(header::COOKIE, format!("session={session}"))
            .retry()
            .send()
            .await
            .map_err(RequestError)?;

        if !response.status().is_redirection() {
            assumption!(
                "like toggle should redirect, got `{}`; the instance's like route may have changed",
                response.status()
            );
        }

        let flashes = self.check_redirect_flashes(&response, &session).await?;

        if flashes
            .iter()
            .any(|flash| flash.contains("like your own messages"))
        {
            return Err(LikeError::OwnWarble);
        }

        Ok(())
    }

    pub(crate) async fn follow(&self, user: u32) -> Result<(), FollowError> {
        let session = self.session.validate(self).await?;

        let response = self
            .http
            .post(format!("{}users/follow/{user}", self.base))
            .header(header::COOKIE, format!("session={session}"))
            .retry()
            .send()
            .await
            .map_err(RequestError)?;

        if !response.status().is_redirection() {
            assumption!(
                "follow should redirect, got `{}`; the instance's follow route may have changed",
                response.status()
            );
        }

        self.check_redirect_flashes(&response, &session).await?;

        Ok(())
    }

    pub(crate) async fn unfollow(&self, user: u32) -> Result<(), FollowError> {
        let session = self.session.validate(self).await?;

        let response = self
            .http
            .post(format!("{}users/stop-following/{user}", self.base))
            .header(header::COOKIE, format!("session={session}"))
            .retry()
            .send()
            .await
            .map_err(RequestError)?;

        if !response.status().is_redirection() {
            assumption!(
                "unfollow should redirect, got `{}`; the instance's follow route may have changed",
                response.status()
            );
        }

        self.check_redirect_flashes(&response, &session).await?;

        Ok(())
    }

    pub(crate) async fn accept_request(&self, sender: u32) -> Result<(), FollowRequestError> {
        let session = self.session.validate(self).await?;

        let response = self
            .http
            .post(format!("{}requests/accept/{sender}", self.base))
            .header(header::COOKIE, format!("session={session}"))
            .retry()
            .send()
            .await
            .map_err(RequestError)?;

        // The instance 404s when no request from that account is pending.
        if response.status() == StatusCode::NOT_FOUND {
            return Err(FollowRequestError::NoPendingRequest);
        }

        if !response.status().is_redirection() {
            assumption!(
                "accepting a follow request should redirect to the notifications page, got `{}`",
                response.status()
            );
        }

        self.check_redirect_flashes(&response, &session).await?;

        Ok(())
    }

    pub(crate) async fn decline_request(&self, sender: u32) -> Result<(), FollowRequestError> {
        let session = self.session.validate(self).await?;

        let response = self
            .http
            .post(format!("{}requests/delete/{sender}", self.base))
            .header(header::COOKIE, format!("session={session}"))
            .retry()
            .send()
            .await
            .map_err(RequestError)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(FollowRequestError::NoPendingRequest);
        }

        if !response.status().is_redirection() {
            assumption!(
                "declining a follow request should redirect to the notifications page, got `{}`",
                response.status()
            );
        }

        self.check_redirect_flashes(&response, &session).await?;

        Ok(())
    }

    /// Follows a mutation's redirect by hand and reads its flash messages.
    ///
    /// A danger flash of "Access unauthorized." means the session was stale;
    /// that one is handled here since every mutation can hit it. Remaining
    /// flashes are returned for operation-specific inspection.
    async fn check_redirect_flashes(
        &self,
        response: &reqwest::Response,
        session: &ValidSession,
    ) -> Result<Vec<String>, SessionError> {
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|location| location.to_str().ok())
            .assumption("redirect should carry a `Location` header")?;

        let target = self
            .base
            .join(location)
            .assumption(format!("`{location}` should join onto the instance base URL"))?;

        let html = self.get_html(target, Some(session)).await?;

        let flashes = flashes(&html)?;

        if flashes
            .iter()
            .any(|flash| flash.contains("Access unauthorized"))
        {
            return Err(SessionError::InvalidSession);
        }

        Ok(flashes)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

/// Pulls the `session` cookie value out of a response's `Set-Cookie` headers.
fn cookie(response: &reqwest::Response) -> Option<String> {
    for header in response.headers().get_all(header::SET_COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };

        if let Some(rest) = value.strip_prefix("session=") {
            let session = rest.split(';').next().unwrap_or(rest);
            if !session.is_empty() {
                return Some(session.to_owned());
            }
        }
    }

    None
}

/// Reads the hidden CSRF input the Flask-WTF forms render.
fn csrf_token(html: &Html) -> Option<String> {
    let selector = Selector::parse("input[name='csrf_token']").ok()?;

    html.select(&selector)
        .next()
        .and_then(|input| input.attr("value"))
        .map(ToOwned::to_owned)
}

/// Collects the danger flash messages rendered on a page.
fn flashes(html: &Html) -> Result<Vec<String>, crate::stdx::error::Assumption> {
    let selector =
        Selector::parse("div.alert-danger").assumption("flash selector should parse")?;

    Ok(html
        .select(&selector)
        .map(|alert| alert.text().collect::<String>().trim().to_owned())
        .collect())
}

/// Collects the accounts rendered as user cards on a listing page.
///
/// A card can carry several profile anchors (avatar and name both link);
/// each card yields exactly one account.
pub(crate) fn user_cards(
    client: &Client,
    html: &Html,
) -> Result<Vec<User>, crate::stdx::error::Assumption> {
    let card = Selector::parse("div.user-card").assumption("user card selector should parse")?;
    let link =
        Selector::parse("a[href^='/users/']").assumption("profile link selector should parse")?;

    let mut users = Vec::new();

    for card in html.select(&card) {
        let anchor = card
            .select(&link)
            .next()
            .assumption("user card should link to the account's profile")?;

        let href = anchor
            .attr("href")
            .assumption("user card anchor should have an `href`")?;

        let id = user_id_from_path(href)
            .assumption(format!("`{href}` should be a `/users/{{id}}` path"))?;

        users.push(User::untracked(client, id));
    }

    Ok(users)
}

/// A page is logged-in when the navbar renders the logout link.
fn is_logged_in(html: &Html) -> Result<bool, crate::stdx::error::Assumption> {
    let selector =
        Selector::parse("a[href='/logout']").assumption("logout link selector should parse")?;

    Ok(html.select(&selector).next().is_some())
}

static USER_HREF: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::expect_used, reason = "the pattern is a known-valid literal")]
    Regex::new(r"^/users/(\d+)").expect("user href pattern should compile")
});

static MESSAGE_HREF: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::expect_used, reason = "the pattern is a known-valid literal")]
    Regex::new(r"^/messages/(\d+)$").expect("message href pattern should compile")
});

static REQUEST_ACTION: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::expect_used, reason = "the pattern is a known-valid literal")]
    Regex::new(r"^/requests/accept/(\d+)$").expect("request action pattern should compile")
});

pub(crate) fn user_id_from_path(path: &str) -> Option<u32> {
    USER_HREF
        .captures(path)
        .and_then(|captures| captures.get(1))
        .and_then(|id| u32::from_str(id.as_str()).ok())
}

pub(crate) fn warble_id_from_path(path: &str) -> Option<WarbleId> {
    MESSAGE_HREF
        .captures(path)
        .and_then(|captures| captures.get(1))
        .and_then(|id| id.as_str().parse().ok())
}

fn request_sender_from_path(path: &str) -> Option<u32> {
    REQUEST_ACTION
        .captures(path)
        .and_then(|captures| captures.get(1))
        .and_then(|id| u32::from_str(id.as_str()).ok())
}

pub(crate) struct ValidSession(Arc<str>);

impl Display for ValidSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Session(Option<Arc<str>>);

impl Session {
    #[inline]
    fn new(session: &str) -> Self {
        Self(Some(Arc::from(session)))
    }

    fn value(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Proves the session still logs in by checking that the home page
    /// renders the authenticated navbar.
    pub(crate) async fn validate(&self, client: &Client) -> Result<ValidSession, SessionError> {
        let Some(session) = &self.0 else {
            return Err(SessionError::NoSessionProvided);
        };

        let response = client
            .http
            .get(client.base.clone())
            .header(header::COOKIE, format!("session={session}"))
            .retry()
            .send()
            .await
            .map_err(RequestError)?;

        let html = Html::parse_document(&response.text().await.map_err(RequestError)?);

        if !is_logged_in(&html)? {
            return Err(SessionError::InvalidSession);
        }

        Ok(ValidSession(session.clone()))
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.0.as_ref().is_none_or(|session| session.is_empty())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn session_should_be_empty() {
        let session = Session::default();
        assert!(session.is_empty());
    }

    #[test]
    fn session_should_not_be_empty() {
        let session = Session::new("session");
        assert!(!session.is_empty());
    }

    #[test]
    fn should_find_csrf_token_in_form() {
        let html = Html::parse_document(
            r#"<form method="POST" id="user_form">
                <input id="csrf_token" name="csrf_token" type="hidden" value="IjA3ZiI.token">
                <input name="username" type="text">
            </form>"#,
        );

        assert_eq!(Some("IjA3ZiI.token".to_owned()), csrf_token(&html));
    }

    #[test]
    fn should_collect_danger_flashes() -> Result<(), crate::stdx::error::Assumption> {
        let html = Html::parse_document(
            r#"<div class="alert alert-danger">Access unauthorized.</div>
               <div class="alert alert-success">Welcome back!</div>"#,
        );

        let flashes = flashes(&html)?;
        assert_eq!(vec!["Access unauthorized.".to_owned()], flashes);

        Ok(())
    }

    #[test]
    fn should_detect_logged_in_navbar() -> Result<(), crate::stdx::error::Assumption> {
        let logged_in = Html::parse_document(r#"<nav><a href="/logout">Log out</a></nav>"#);
        let anon = Html::parse_document(r#"<nav><a href="/login">Log in</a></nav>"#);

        assert!(is_logged_in(&logged_in)?);
        assert!(!is_logged_in(&anon)?);

        Ok(())
    }

    #[test]
    fn should_extract_user_id_from_path() {
        assert_eq!(Some(7), user_id_from_path("/users/7"));
        assert_eq!(Some(7), user_id_from_path("/users/7/likes"));
        assert_eq!(None, user_id_from_path("/messages/7"));
        assert_eq!(None, user_id_from_path("/users/abc"));
    }

    #[test]
    fn should_extract_warble_id_from_path() {
        assert_eq!(Some(WarbleId::from(42)), warble_id_from_path("/messages/42"));
        assert_eq!(None, warble_id_from_path("/messages/42/likes"));
        assert_eq!(None, warble_id_from_path("/users/42"));
    }

    #[test]
    fn should_extract_request_sender_from_action() {
        assert_eq!(Some(7), request_sender_from_path("/requests/accept/7"));
        assert_eq!(None, request_sender_from_path("/requests/delete/7"));
        assert_eq!(None, request_sender_from_path("/users/7"));
    }

    #[test]
    fn should_collect_one_account_per_user_card() -> Result<(), crate::stdx::error::Assumption> {
        let client = Client::new();
        let html = Html::parse_document(
            r#"<div class="card user-card">
                <a href="/users/7"><img src="/static/images/default-pic.png"></a>
                <a href="/users/7"><p>@tuckerdiane</p></a>
            </div>
            <div class="card user-card">
                <a href="/users/9"><p>@wknight</p></a>
            </div>"#,
        );

        let users = user_cards(&client, &html)?;

        let ids = users.iter().map(User::id).collect::<Vec<_>>();
        assert_eq!(vec![7, 9], ids);

        Ok(())
    }

    #[test]
    fn should_list_follow_requests_from_accept_forms() {
        let html = Html::parse_document(
            r#"<ul class="list-group">
                <li class="list-group-item">
                    <a href="/users/7"><p>@tuckerdiane</p></a>
                    <form method="POST" action="/requests/accept/7"><button>Accept</button></form>
                    <form method="POST" action="/requests/delete/7"><button>Decline</button></form>
                </li>
            </ul>"#,
        );

        let form = Selector::parse("form[action^='/requests/accept/']").unwrap();

        let senders = html
            .select(&form)
            .filter_map(|form| form.attr("action"))
            .filter_map(request_sender_from_path)
            .collect::<Vec<_>>();

        assert_eq!(vec![7], senders);
    }
}
