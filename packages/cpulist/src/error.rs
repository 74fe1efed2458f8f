use thiserror::Error;

/// Errors that can occur when processing individual cpulist items.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The caller provided a supposed cpulist item but it did not match the expected format.
    #[error("invalid cpulist syntax: '{invalid_value}' is invalid: {problem}")]
    InvalidSyntax {
        /// The specific value that was invalid. This is either a whole item or the start or
        /// end of a range, depending on the problem.
        invalid_value: String,

        /// A human-readable description of the problem.
        problem: String,
    },
}

impl Error {
    pub(crate) fn invalid(invalid_value: impl Into<String>, problem: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            invalid_value: invalid_value.into(),
            problem: problem.into(),
        }
    }
}

/// A specialized `Result` type for cpulist operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug);

    #[test]
    fn display_names_value_and_problem() {
        let error = Error::invalid("abc", "not a number");

        assert_eq!(
            error.to_string(),
            "invalid cpulist syntax: 'abc' is invalid: not a number"
        );
    }
}
