use actix_web::http::StatusCode;
use actix_web::ResponseError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    #[error("invalid play: {0}")]
    InvalidPlay(String),

    #[error("no plays fetched yet")]
    FetchNotPerformed,

    #[error("game {0} not found in plays")]
    GameNotFound(u64),

    #[error("no cooperative wins or losses recorded")]
    DivisionByZero,
}

impl Error {
    /// Any failure talking to the remote API or reading its response.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::Request(_) | Error::Remote(_) | Error::Xml(_) | Error::InvalidPlay(_)
        )
    }

    /// Failures worth retrying: timeouts, dropped connections, 5xx and 429.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Request(e) => e.is_timeout() || e.is_connect(),
            Error::Remote(e) => {
                e.status().is_server_error() || e.status() == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::GameNotFound(_) => StatusCode::NOT_FOUND,
            e if e.is_remote() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(thiserror::Error, Debug)]
#[error("{url} returned {status}")]
pub struct RemoteError {
    url: String,
    status: reqwest::StatusCode,
}

impl RemoteError {
    pub fn new(url: &str, status: reqwest::StatusCode) -> Self {
        Self {
            url: url.into(),
            status,
        }
    }

    pub fn status(&self) -> reqwest::StatusCode {
        self.status
    }
}

#[derive(thiserror::Error, Debug)]
#[error("{source} ({url})")]
pub struct XmlError {
    url: String,
    #[source]
    source: quick_xml::DeError,
}

impl XmlError {
    pub fn new(url: &str, source: quick_xml::DeError) -> Self {
        Self {
            url: url.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod test {
    use actix_web::http::StatusCode;
    use actix_web::ResponseError;

    use crate::error::{Error, RemoteError};

    #[test]
    fn test_remote_status_is_transient_only_for_server_side_failures() {
        let remote = |status| Error::from(RemoteError::new("x", status));
        let unavailable = remote(reqwest::StatusCode::SERVICE_UNAVAILABLE);
        let throttled = remote(reqwest::StatusCode::TOO_MANY_REQUESTS);
        let missing = remote(reqwest::StatusCode::NOT_FOUND);

        assert!(unavailable.is_transient());
        assert!(throttled.is_transient());
        assert!(!missing.is_transient());
        assert!(missing.is_remote());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::GameNotFound(7).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::InvalidPlay("no item".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            Error::FetchNotPerformed.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert!(!Error::DivisionByZero.is_transient());
    }
}
