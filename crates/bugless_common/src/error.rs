use thiserror::Error;

/// Reasons a [`QueryFilter`](crate::QueryFilter) cannot be turned into a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// Neither `by_id` nor `by_search` is set.
    #[error("query filter has no selection mode set")]
    NoSelectionMode,

    /// More than one selection mode is set.
    #[error("query filter has more than one selection mode set")]
    MultipleSelectionModes,

    /// The search string is empty once surrounding whitespace is ignored.
    #[error("search must be set and non-empty")]
    EmptySearch,

    /// Issue ids start at 1.
    #[error("issue id must be positive, got {0}")]
    InvalidId(i64),
}

/// Errors produced while framing or unframing wire payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Bincode refused to serialize the payload.
    #[error("failed to encode frame: {0}")]
    Encode(String),

    /// The payload bytes are not a valid bincode encoding of the expected type.
    #[error("failed to decode frame: {0}")]
    Decode(String),

    /// Fewer bytes than the 8-byte length prefix.
    #[error("frame of {len} bytes is shorter than its length prefix")]
    FrameTooShort { len: usize },

    /// The length prefix announces a payload over the accepted maximum.
    #[error("frame announces {len} bytes, maximum is {max}")]
    FrameTooLarge { len: u64, max: u64 },
}
