//! Shared HTTP plumbing: the crate's user agent and transient-failure retry.

use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;

pub static DEFAULT_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// How many times a request is issued before its outcome is taken as final.
const TRIES: u32 = 5;

/// A request that retries transport errors and throttling responses with a
/// jittered, growing delay.
///
/// A local Flask dev server drops connections while reloading, and a fronting
/// proxy answers `429`/`503` under load; both clear within seconds, which is
/// the window the backoff covers. The last try's outcome is returned as-is.
pub struct Retry(RequestBuilder);

impl Retry {
    pub async fn send(self) -> Result<Response, reqwest::Error> {
        let mut remaining = TRIES;
        let mut wait = fastrand::u64(1..=3);

        loop {
            remaining -= 1;

            #[allow(
                clippy::expect_used,
                reason = "a builder only fails to clone for streaming bodies, and every request here carries a buffered body"
            )]
            let request = self
                .0
                .try_clone()
                .expect("request bodies are buffered, never streamed");

            match request.send().await {
                Ok(response) if throttled(response.status()) && remaining > 0 => {}
                Err(_) if remaining > 0 => {}
                outcome => return outcome,
            }

            tokio::time::sleep(Duration::from_secs(wait)).await;
            wait += 2 + fastrand::u64(1..=3);
        }
    }
}

fn throttled(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE
}

pub trait IRetry {
    fn retry(self) -> Retry;
}

impl IRetry for RequestBuilder {
    fn retry(self) -> Retry {
        Retry(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_user_agent_should_be_expected() {
        const AGENT: &str = "warbler/0.1.0";
        const { assert!(AGENT.len() == DEFAULT_USER_AGENT.len()) }
        assert_eq!(AGENT, DEFAULT_USER_AGENT);
    }

    #[test]
    fn should_only_treat_throttle_statuses_as_transient() {
        assert!(throttled(StatusCode::TOO_MANY_REQUESTS));
        assert!(throttled(StatusCode::SERVICE_UNAVAILABLE));

        // Other failures are application outcomes, not congestion.
        assert!(!throttled(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!throttled(StatusCode::NOT_FOUND));
        assert!(!throttled(StatusCode::OK));
    }
}
