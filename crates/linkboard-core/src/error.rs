//! Error types for `linkboard-core`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// A paste held more candidate URLs than a single ingestion accepts.
  /// Reported in-band through `invalidOrEmpty`, never as a failed request.
  #[error("Too many URLs: {count} (max {max})")]
  TooManyUrls { count: usize, max: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
