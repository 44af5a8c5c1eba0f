use thiserror::Error;

use transport::TransportError;
use transport_codecs::CodecError;

pub type ChannelResult<T> = Result<T, ChannelError>;

#[derive(Debug, Error)]
pub enum ChannelError {
    /// The channel is used in a way the build or call site has to fix.
    #[error("invalid channel configuration: {0}")]
    Config(String),

    #[error("value for key `{key}` cannot be sent: {source}")]
    UnsupportedValue {
        key: String,
        #[source]
        source: CodecError,
    },

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl ChannelError {
    pub fn config(msg: impl Into<String>) -> Self {
        ChannelError::Config(msg.into())
    }
}
