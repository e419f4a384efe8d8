//! Conversions from external infrastructure errors into domain errors.

use datastack_domain::DataStackError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub DataStackError);

impl From<InfraError> for DataStackError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<DataStackError> for InfraError {
    fn from(value: DataStackError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → DataStackError */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for InfraError {
    fn from(err: HttpError) -> Self {
        let status_code = err.status().map(|s| s.as_u16());
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();

        let message = if err.is_timeout() {
            format!("http request timed out: {url}")
        } else if err.is_connect() {
            format!("http connection failed: {url}: {err}")
        } else if err.is_builder() {
            format!("invalid http request: {err}")
        } else if err.is_decode() {
            format!("failed to decode http response from {url}: {err}")
        } else {
            format!("http request failed: {err}")
        };

        InfraError(DataStackError::Transport { status_code, body: None, message })
    }
}

/* -------------------------------------------------------------------------- */
/* url::ParseError → DataStackError */
/* -------------------------------------------------------------------------- */

impl From<url::ParseError> for InfraError {
    fn from(err: url::ParseError) -> Self {
        InfraError(DataStackError::Config(format!("invalid host url: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_parse_errors_become_config_errors() {
        let parse_err = url::Url::parse("not a url").unwrap_err();
        let err: DataStackError = InfraError::from(parse_err).into();
        assert!(matches!(err, DataStackError::Config(msg) if msg.contains("invalid host url")));
    }

    #[tokio::test]
    async fn connect_failures_become_transport_errors() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = reqwest::get(format!("http://{addr}")).await.unwrap_err();
        let converted: DataStackError = InfraError::from(err).into();
        match converted {
            DataStackError::Transport { status_code, message, .. } => {
                assert_eq!(status_code, None);
                assert!(message.contains("http"));
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}
