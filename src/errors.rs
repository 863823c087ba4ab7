//! Errors that can happen when interacting with a Warbler instance.
#![allow(missing_docs)]

use thiserror::Error;

pub use _inner::{
    ClientBuilderError, ClientError, Error, FollowError, FollowRequestError, FollowingError,
    LikeError, LoginError, NotificationsError, PostError, SessionError, SignupError,
    TimelineError, UserError, WarbleError,
};

#[derive(Debug, Error)]
#[error(transparent)]
pub struct RequestError(#[from] pub(crate) reqwest::Error);

/// Represents an invalid warble URL.
///
/// Given how exact the `/messages/{id}` format is, and the unlikely nature
/// of something actionable being done, this error is merely a message
/// carrier that says what expectations were violated.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct InvalidWarbleUrl(String);

impl InvalidWarbleUrl {
    pub(crate) fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

mod _inner {
    use crate::stdx::error::Assumption;
    use error_set::error_set;

    error_set! {
        #[expect(
            clippy::error_impl_error,
            reason = "`Error` is a ball of mud enum thats built through codegen; only meant for prototyping"
        )]
        Error := {
            InvalidWarbleUrl(super::InvalidWarbleUrl),
        }
        || Base
        || LikeError
        || TimelineError
        || WarbleError
        || UserError
        || FollowError
        || FollowingError
        || FollowRequestError
        || NotificationsError
        || LoginError
        || SignupError
        || PostError
        || ClientError
        || SessionError

        LikeError := {
            #[display("cannot like your own warble")]
            OwnWarble,
        } || Base || ClientError || SessionError

        TimelineError := Base || ClientError || SessionError

        WarbleError := Base || ClientError

        UserError := Base || ClientError

        FollowError := Base || ClientError || SessionError

        FollowingError := {
            #[display("not authorized to view this account's follow lists")]
            NotAuthorized,
        } || Base || ClientError

        FollowRequestError := {
            #[display("no pending follow request from this account")]
            NoPendingRequest,
        } || Base || ClientError || SessionError

        NotificationsError := Base || ClientError || SessionError

        LoginError := {
            #[display("invalid username or password")]
            InvalidCredentials,
        } || Base || ClientError

        SignupError := {
            #[display("username already exists")]
            UsernameTaken,
        } || Base || ClientError

        PostError := Base || ClientError || SessionError

        SessionError := Base || ClientError || NoSessionProvided || InvalidSession

        ClientBuilderError := {
            BuildFailed,
        }

        // --- Internal ---

        InvalidSession := {
            #[display("session invalid or expired")]
            InvalidSession,
        }

        NoSessionProvided := {
            #[display("session not provided")]
            NoSessionProvided,
        }

        ClientError := {
            RequestFailed(super::RequestError),
        }

        Base := {
            Internal(Assumption),
        }
    }
}
