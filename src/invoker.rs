//! Invoker: runs the watched operation and classifies how it ended.

use std::error::Error as StdError;

use crate::domain::{Failure, Outcome};

/// Run `operation` to completion on the calling thread and classify the result.
///
/// Any error is converted with [`Failure::from_error`] and swallowed; the
/// operation's own error domain never reaches the caller. There is no timeout.
///
/// The kind is taken from the error's type name, or from the
/// [`ErrorKind`](std::io::ErrorKind) of an I/O error. Use [`invoke_with`] when
/// neither says anything useful, e.g. for `Box<dyn Error>` or a catch-all
/// application error enum.
pub fn invoke<T, E, F>(operation: F) -> Outcome
where
    F: FnOnce() -> Result<T, E>,
    E: StdError + 'static,
{
    invoke_with(operation, |err| Failure::from_error(&err))
}

/// Like [`invoke`], with a caller-supplied classification for error types
/// whose type name is not meaningful (boxed or opaque errors).
pub fn invoke_with<T, E, F, C>(operation: F, classify: C) -> Outcome
where
    F: FnOnce() -> Result<T, E>,
    C: FnOnce(E) -> Failure,
{
    log::debug!("running watched operation");
    match operation() {
        Ok(_) => {
            log::debug!("watched operation completed");
            Outcome::Success
        }
        Err(err) => {
            let failure = classify(err);
            log::warn!("watched operation failed: {failure}");
            Outcome::Failure(failure)
        }
    }
}
