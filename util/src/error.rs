use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// The two families of failures a codec can report.
///
/// `MalformedInput` is raised while parsing, before any instance exists.
/// `InvalidState` is raised when pending mutations cannot be written out.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedInput,
    InvalidState,
}

#[derive(Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    #[error("buffer: short")]
    ErrBufferShort,
    #[error("marshal_to output size {0}, but expect {1}")]
    ErrWrongMarshalSize(usize, usize),
    #[error("{0}")]
    Std(#[source] StdError),
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn from_std<T>(error: T) -> Self
    where
        T: std::error::Error + Send + Sync + 'static,
    {
        Error::Std(StdError(Box::new(error)))
    }

    pub fn downcast_ref<T: std::error::Error + 'static>(&self) -> Option<&T> {
        if let Error::Std(s) = self {
            return s.0.downcast_ref();
        }

        None
    }
}

/// An escape hatch to carry a protocol crate's own error through the marshal traits.
///
/// `Marshal`, `Unmarshal` and `Serializable` produce `util::Error`, while the rtp and rtcp
/// crates raise their local error enums. `util::Error::from_std` keeps the original error
/// so callers can still downcast to it.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StdError(pub Box<dyn std::error::Error + Send + Sync>);

impl PartialEq for StdError {
    fn eq(&self, _: &Self) -> bool {
        false
    }
}
