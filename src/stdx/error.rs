use thiserror::Error;

macro_rules! assumption {
    ($msg:literal $(, $args:expr)* ) => {{
        return Err($crate::stdx::error::Assumption::from(format!($msg $(, $args)*)).into());
    }};
    ($err:expr) => {{
        return Err($crate::stdx::error::Assumption::from(format!("{}", $err)).into());
    }};
    ($cond:expr, $msg:literal $(, $args:expr)* ) => {{
        if !$cond {
            return Err($crate::stdx::error::Assumption::from(format!("`{}`, {}", stringify!($cond), format!($msg $(, $args)*))).into());
        }
    }};
}

pub(crate) use assumption;

/// Represents an assumption about the Warbler instance that did not hold.
///
/// If this is returned, this is considered a bug that must be fixed!
///
/// This error is not actionable by library user, and must be fixed via
/// internal code changes! Please open an issue!
///
/// # Use
///
/// The rule of thumb for this error is that it is only used when interacting
/// with the instance's rendered markup, as opposed to input data that might
/// be passed to the library. The templates a Warbler instance serves are not
/// versioned, so liberal pre and post checks make sure any change underneath
/// the library is caught as soon as possible.
#[derive(Debug, Error)]
#[error("library assumption violated: {0}")]
pub struct Assumption(String);

impl From<String> for Assumption {
    #[inline]
    fn from(msg: String) -> Self {
        Self(msg)
    }
}

pub trait Assume<T> {
    type Output;

    fn assumption(self, msg: impl Into<String>) -> Self::Output;
}

impl<T> Assume<T> for Option<T> {
    type Output = Result<T, Assumption>;

    #[inline]
    fn assumption(self, msg: impl Into<String>) -> Self::Output {
        self.ok_or_else(|| Assumption(msg.into()))
    }
}

impl<T, E> Assume<T> for Result<T, E> {
    type Output = Result<T, Assumption>;

    #[inline]
    fn assumption(self, msg: impl Into<String>) -> Self::Output {
        self.map_err(|_err: _| Assumption(msg.into()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    #[ignore = "this should only be manually verified"]
    fn should_bail_with_message() -> Result<(), Assumption> {
        assumption!("failed to uphold assumption");
    }

    #[test]
    #[ignore = "this should only be manually verified"]
    fn should_bail_on_condition_fail_with_message() -> Result<(), Assumption> {
        let entries: Vec<()> = vec![];
        assumption!(
            !entries.is_empty(),
            "timeline entries should not be empty, but was {}",
            entries.len()
        );
        Ok(())
    }

    #[test]
    #[ignore = "this should only be manually verified"]
    fn should_error_with_assumption() -> Result<(), Assumption> {
        let err: Option<()> = None;
        err.assumption("failed to find `i.fa-heart` html tag on home page")?;
        Ok(())
    }
}
