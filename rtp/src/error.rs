use thiserror::Error;
use util::ErrorKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    #[error("RTP header size insufficient")]
    ErrHeaderSizeInsufficient,
    #[error("RTP header size insufficient for extension")]
    ErrHeaderSizeInsufficientForExtension,
    #[error("RTP version {0} is not supported")]
    ErrInvalidVersion(u8),
    #[error("RTP padding count does not fit the packet")]
    ErrInvalidPadding,
    #[error("buffer too small")]
    ErrBufferTooSmall,
    #[error("too many CSRCs: {0}, at most 15")]
    ErrTooManyCsrcs(usize),
    #[error("extension not enabled")]
    ErrHeaderExtensionsNotEnabled,
    #[error("extension not found")]
    ErrHeaderExtensionNotFound,

    #[error("header extension payload must be between 1 and 16 bytes for RFC 5285 one byte extensions")]
    ErrRfc8285oneByteHeaderSize,
    #[error("header extension payload must be 255bytes or less for RFC 5285 two byte extensions")]
    ErrRfc8285twoByteHeaderSize,

    #[error("extension_payload must be in 32-bit words")]
    HeaderExtensionPayloadNot32BitWords,
    #[error("RTX payload is too short to carry the original sequence number")]
    ErrRtxPayloadTooShort,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ErrHeaderSizeInsufficient
            | Error::ErrHeaderSizeInsufficientForExtension
            | Error::ErrInvalidVersion(_)
            | Error::ErrInvalidPadding
            | Error::ErrRtxPayloadTooShort => ErrorKind::MalformedInput,
            Error::ErrBufferTooSmall
            | Error::ErrTooManyCsrcs(_)
            | Error::ErrHeaderExtensionsNotEnabled
            | Error::ErrHeaderExtensionNotFound
            | Error::ErrRfc8285oneByteHeaderSize
            | Error::ErrRfc8285twoByteHeaderSize
            | Error::HeaderExtensionPayloadNot32BitWords => ErrorKind::InvalidState,
        }
    }
}

impl From<Error> for util::Error {
    fn from(e: Error) -> Self {
        util::Error::from_std(e)
    }
}

impl PartialEq<util::Error> for Error {
    fn eq(&self, other: &util::Error) -> bool {
        if let Some(down) = other.downcast_ref::<Error>() {
            self == down
        } else {
            false
        }
    }
}
