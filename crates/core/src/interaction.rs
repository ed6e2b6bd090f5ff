//! Capabilities that hand control to the operator or to another program.

use crate::error::Result;

/// Shows a document to the operator.
pub trait Pager {
    /// # Errors
    ///
    /// Returns an error if the document can't be shown.
    fn page(&mut self, document: &[u8]) -> Result<()>;
}

/// Lets the operator rewrite a document and returns the result.
pub trait Editor {
    /// # Errors
    ///
    /// Returns an error if the editor can't be started or exits unsuccessfully.
    fn edit(&mut self, document: &[u8]) -> Result<Vec<u8>>;
}

/// Yes/no questions.
pub trait Prompter {
    /// Returns `true` only for an explicit yes.
    ///
    /// # Errors
    ///
    /// Returns an error if the answer can't be read.
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Accepts `y` in any case with surrounding whitespace; everything else is a no.
pub fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}
