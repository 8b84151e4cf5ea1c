//! HTTP [`Backend`] implementation.
//!
//! [`Backend`]: crate::infra::Backend

mod impls;

use std::time::Duration;

use derive_more::{Debug, Display, Error as StdError};
use secrecy::{ExposeSecret as _, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use tracerr::Traced;
use tracing as log;

use crate::infra::backend;

/// Client of the hosted backend's Postgres RPC surface.
///
/// Every operation is a `POST {base_url}/rest/v1/rpc/{function}` call
/// carrying a JSON argument object. Dates cross this boundary as ISO
/// `YYYY-MM-DD` strings, never as timestamps.
#[derive(Clone, Debug)]
pub struct Http {
    /// Underlying HTTP client.
    client: reqwest::Client,

    /// Configuration of this [`Http`] client.
    config: Config,
}

/// [`Http`] client configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the hosted backend.
    pub base_url: String,

    /// Project API key, sent with every request.
    #[debug(skip)]
    pub api_key: SecretString,

    /// Guest access token, if a session is active.
    ///
    /// Sent as the bearer credential instead of the API key, so the backend
    /// evaluates its row-level rules against the guest.
    #[debug(skip)]
    pub access_token: Option<SecretString>,

    /// Timeout of a single request.
    ///
    /// Submissions are not cancelled client-side beyond this: a response
    /// arriving after the caller lost interest is simply discarded.
    pub timeout: Duration,
}

impl Http {
    /// Creates a new [`Http`] client with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If failed to create a new [`Http`] client.
    pub fn new(config: Config) -> Result<Self, Traced<backend::Error>> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| tracerr::new!(Error::Request(e)))
            .map_err(tracerr::map_from)?;
        Ok(Self { client, config })
    }

    /// Invokes the remote `function` with the provided JSON `args`.
    pub(super) async fn rpc<A, O>(
        &self,
        function: &str,
        args: &A,
    ) -> Result<O, Traced<backend::Error>>
    where
        A: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let url = format!(
            "{}/rest/v1/rpc/{function}",
            self.config.base_url.trim_end_matches('/'),
        );
        let bearer = self
            .config
            .access_token
            .as_ref()
            .unwrap_or(&self.config.api_key);

        let resp = self
            .client
            .post(&url)
            .header("apikey", self.config.api_key.expose_secret())
            .bearer_auth(bearer.expose_secret())
            .json(args)
            .send()
            .await
            .map_err(|e| tracerr::new!(Error::Request(e)))
            .map_err(tracerr::map_from)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body: serde_json::Value =
                resp.json().await.unwrap_or_default();
            let code = body
                .get("code")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_owned();
            let message = body
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_owned();
            log::debug!("rpc `{function}` rejected: {status}: {code}: {message}");
            return Err(tracerr::new!(rejection(code, message)));
        }

        resp.json()
            .await
            .map_err(|e| tracerr::new!(Error::Request(e)))
            .map_err(tracerr::map_from)
    }
}

/// Maps a backend rejection to a [`backend::Error`].
///
/// SQLSTATEs of exclusion/unique violations mean the requested stay lost to
/// a concurrent or pre-existing booking; a raised payment error means the
/// payment leg of the RPC refused the charge.
fn rejection(code: String, message: String) -> backend::Error {
    match code.as_str() {
        "23P01" | "23505" => backend::Error::Overlap,
        "P0001" if message.to_lowercase().contains("payment") => {
            backend::Error::PaymentRejected
        }
        _ => backend::Error::Http(Error::Rejected { code, message }),
    }
}

/// HTTP backend [`Error`].
#[derive(Debug, Display, StdError)]
pub enum Error {
    /// Request failed to send or its payload failed to decode.
    #[display("request failed: {_0}")]
    Request(reqwest::Error),

    /// Backend rejected the call with an unrecognized error.
    #[display("backend rejected the call: {code}: {message}")]
    Rejected {
        /// SQLSTATE (or PostgREST) error code of the rejection.
        code: String,

        /// Human-readable message of the rejection.
        message: String,
    },

    /// Fetched row failed domain validation.
    #[display("invalid `{_0}` in a fetched row")]
    InvalidRow(#[error(not(source))] &'static str),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use crate::infra::backend;

    use super::{rejection, Config, Http};

    #[test]
    fn builds_client_from_config() {
        assert!(Http::new(Config {
            base_url: "http://127.0.0.1:54321".to_owned(),
            api_key: "anon-key".to_owned().into(),
            access_token: None,
            timeout: Duration::from_secs(5),
        })
        .is_ok());
    }

    #[test]
    fn maps_exclusion_violation_to_overlap() {
        assert!(matches!(
            rejection("23P01".into(), "conflicting key value".into()),
            backend::Error::Overlap,
        ));
        assert!(matches!(
            rejection("23505".into(), "duplicate key value".into()),
            backend::Error::Overlap,
        ));
    }

    #[test]
    fn maps_raised_payment_error() {
        assert!(matches!(
            rejection("P0001".into(), "Payment declined by wallet".into()),
            backend::Error::PaymentRejected,
        ));
    }

    #[test]
    fn keeps_unrecognized_rejections_opaque() {
        assert!(matches!(
            rejection("42501".into(), "permission denied".into()),
            backend::Error::Http(_),
        ));
    }
}
