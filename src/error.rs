use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("html parse error: {0}")]
    HtmlParse(String),
    #[error("runtime error: {0}")]
    Runtime(String),
    #[error("selector not found: {0}")]
    SelectorNotFound(String),
    #[error("unsupported selector: {0}")]
    UnsupportedSelector(String),
    #[error("type mismatch for {selector}: expected {expected}, actual {actual}")]
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    #[error(
        "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
    )]
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl Error {
    pub(crate) fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(message.into())
    }
}
