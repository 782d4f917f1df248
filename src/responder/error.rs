use thiserror::Error;

/// Faults raised while asking the completion endpoint for a reply.
#[derive(Error, Debug)]
pub enum ResponderError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Completion endpoint returned HTTP {status}")]
    Status { status: u16 },
}

pub type ResponderResult<T> = Result<T, ResponderError>;
