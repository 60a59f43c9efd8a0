use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use prometheus::{
    register_histogram, register_int_counter_vec, Histogram, IntCounterVec,
};
use reqwest::redirect::Policy;
use reqwest::{Certificate, Client, StatusCode, Url};
use serde::Deserialize;

use super::{Error, UserDirectory};
use crate::identity::Identity;
use crate::secret::Secret;

static DIRECTORY_LOOKUPS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "directory_lookup_requests_total",
        "Total user directory lookup requests",
        &["result"]
    )
    .unwrap()
});

static DIRECTORY_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    register_histogram!(
        "directory_lookup_duration_seconds",
        "User directory lookup request duration"
    )
    .unwrap()
});

#[derive(Clone, Debug, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the identity record collection; lookups append the
    /// percent-encoded username as one extra path segment.
    pub url: String,

    #[serde(default = "BackendConfig::default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(flatten)]
    pub auth: Option<EndpointAuth>,

    pub server_ca_bundle: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointAuth {
    BasicAuth { username: String, password: Secret },
    BearerToken(Secret),
}

impl BackendConfig {
    fn default_timeout_ms() -> u64 {
        5000
    }

    pub fn validate(&self) -> Result<(), Error> {
        if let Err(e) = Url::parse(&self.url) {
            let msg = format!("Invalid directory URL: {e}");
            return Err(Error::Initialization(msg));
        }

        Ok(())
    }
}

/// Wire format of an identity record served by the directory endpoint.
#[derive(Debug, Deserialize)]
struct UserRecord {
    id: String,
    username: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl From<UserRecord> for Identity {
    fn from(record: UserRecord) -> Self {
        Identity {
            id: record.id,
            username: record.username,
            display_name: record.display_name,
        }
    }
}

/// Directory backend resolving usernames against a REST endpoint:
/// `GET {url}/{username}` returning a JSON identity record, 404 for unknown
/// usernames.
#[derive(Debug)]
pub struct Backend {
    config: BackendConfig,
    client: Client,
}

fn load_file(path: &PathBuf) -> Result<Vec<u8>, Error> {
    match std::fs::read(path) {
        Ok(pem) => Ok(pem),
        Err(e) => {
            let msg = format!("Failed to read certificate file: {e}");
            Err(Error::Initialization(msg))
        }
    }
}

fn load_certificate_bundle(path: &PathBuf) -> Result<Vec<Certificate>, Error> {
    let certificate_pem = load_file(path)?;

    match Certificate::from_pem_bundle(&certificate_pem) {
        Ok(certs) => Ok(certs),
        Err(e) => {
            let msg = format!("Failed to parse certificate: {e}");
            Err(Error::Initialization(msg))
        }
    }
}

impl Backend {
    pub fn new(config: &BackendConfig) -> Result<Self, Error> {
        config.validate()?;

        let mut client_builder = Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_millis(config.timeout_ms));

        if let Some(ca_bundle) = &config.server_ca_bundle {
            let ca_bundle_certs = load_certificate_bundle(ca_bundle)?;
            for cert in ca_bundle_certs {
                client_builder = client_builder.add_root_certificate(cert);
            }
        }

        let client = client_builder
            .build()
            .map_err(|e| Error::Initialization(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config: config.clone(),
            client,
        })
    }

    fn lookup_url(&self, username: &str) -> Result<Url, Error> {
        let mut url = Url::parse(&self.config.url)
            .map_err(|e| Error::Initialization(format!("Invalid directory URL: {e}")))?;

        url.path_segments_mut()
            .map_err(|()| Error::Initialization("Directory URL cannot be a base".to_string()))?
            .push(username);

        Ok(url)
    }
}

#[async_trait]
impl UserDirectory for Backend {
    async fn lookup_by_username(&self, username: &str) -> Result<Option<Identity>, Error> {
        let url = self.lookup_url(username)?;

        let mut request = self.client.get(url);
        match &self.config.auth {
            Some(EndpointAuth::BasicAuth { username, password }) => {
                request = request.basic_auth(username, Some(password.expose()));
            }
            Some(EndpointAuth::BearerToken(token)) => {
                request = request.bearer_auth(token.expose());
            }
            None => {}
        }

        let timer = DIRECTORY_DURATION.start_timer();
        let response = request.send().await;
        timer.observe_duration();

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                DIRECTORY_LOOKUPS
                    .with_label_values(&["transport_error"])
                    .inc();
                return Err(Error::Transport(format!("Directory request failed: {e}")));
            }
        };

        match response.status() {
            StatusCode::NOT_FOUND => {
                DIRECTORY_LOOKUPS.with_label_values(&["not_found"]).inc();
                Ok(None)
            }
            status if status.is_success() => match response.json::<UserRecord>().await {
                Ok(record) => {
                    DIRECTORY_LOOKUPS.with_label_values(&["found"]).inc();
                    Ok(Some(record.into()))
                }
                Err(e) => {
                    DIRECTORY_LOOKUPS
                        .with_label_values(&["invalid_record"])
                        .inc();
                    Err(Error::InvalidRecord(format!(
                        "Undecodable directory record: {e}"
                    )))
                }
            },
            status => {
                DIRECTORY_LOOKUPS
                    .with_label_values(&["transport_error"])
                    .inc();
                Err(Error::Transport(format!(
                    "Directory responded with status {status}"
                )))
            }
        }
    }
}
