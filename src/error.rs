use thiserror::Error;


/// Everything that can go wrong while decoding a dataset or running
/// the network.
///
/// Decoding and numeric primitives fail on the first invalid condition;
/// no partial results are produced and nothing is retried.

#[derive(Error, Debug)]
pub enum Error {
  /// A dataset file could not be opened or read.
  #[error("io: {0}")]
  Io(#[from] std::io::Error),

  /// A dataset file is structurally invalid: bad magic, zero
  /// dimensions or fewer bytes than the header declares.
  #[error("format: {0}")]
  Format(String),

  /// Numeric input violates a dimension or range requirement.
  #[error("domain: {0}")]
  Domain(String),
}

impl Error {
  pub(crate) fn format(msg: impl Into<String>) -> Self {
    Self::Format(msg.into())
  }

  pub(crate) fn domain(msg: impl Into<String>) -> Self {
    Self::Domain(msg.into())
  }
}

pub type Result<T> = std::result::Result<T, Error>;
