use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use common::config::{Credentials, TrackerConfig};
use reqwest::header::CONTENT_TYPE;
use reqwest::RequestBuilder;
use tracing::{debug, instrument};
use url::Url;

use crate::error::TrackerError;
use crate::metrics;
use crate::xmlrpc::{decode_response, encode_call, XmlRpcValue};

/// Columns requested from the CSV export, in export order.
pub const CSV_COLUMNS: &[&str] = &[
    "id",
    "title",
    "stage",
    "creation",
    "creator",
    "activity",
    "actor",
    "nosy",
    "type",
    "components",
    "versions",
    "dependencies",
    "assignee",
    "keywords",
    "priority",
    "status",
    "resolution",
    "nosy_count",
    "message_count",
];

/// Remote tracker as seen by the loaders. Every call is attempted once;
/// failures are returned to the caller untouched.
#[async_trait]
pub trait Tracker: Send + Sync {
    /// Labels of every item of `class`. For `"user"` these are user ids.
    async fn list(&self, class: &str) -> Result<Vec<String>>;
    /// Canonical value for `label` within `class`.
    async fn lookup(&self, class: &str, label: &str) -> Result<String>;
    /// Full CSV export of all issues.
    async fn export_csv(&self) -> Result<Vec<u8>>;
}

pub struct RoundupTracker {
    http: reqwest::Client,
    rpc_url: Url,
    csv_url: Url,
    credentials: Option<Credentials>,
}

impl RoundupTracker {
    pub fn new(config: &TrackerConfig) -> Result<Self> {
        let (base, credentials) = config.endpoint()?;
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .context("building http client")?;
        Ok(Self {
            http,
            rpc_url: base.join("xmlrpc")?,
            csv_url: csv_export_url(&base)?,
            credentials,
        })
    }

    pub fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }

    pub fn csv_url(&self) -> &Url {
        &self.csv_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(creds) => request.basic_auth(&creds.username, creds.password.as_ref()),
            None => request,
        }
    }

    #[instrument(skip(self, params), fields(url = %self.rpc_url))]
    async fn call(&self, method: &str, params: &[&str]) -> Result<XmlRpcValue> {
        let start = Instant::now();
        let result = async {
            let body = encode_call(method, params);
            let request = self
                .http
                .post(self.rpc_url.clone())
                .header(CONTENT_TYPE, "text/xml")
                .body(body);
            let response = self.authorize(request).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(TrackerError::status(status, format!("xmlrpc {method}")).into());
            }
            let text = response.text().await?;
            Ok::<_, anyhow::Error>(decode_response(&text)?)
        }
        .await;
        metrics::observe(method, result.is_ok(), start.elapsed().as_secs_f64());
        result
    }
}

#[async_trait]
impl Tracker for RoundupTracker {
    async fn list(&self, class: &str) -> Result<Vec<String>> {
        let items = self.call("list", &[class]).await?.into_array()?;
        let labels = items
            .iter()
            .map(|item| {
                item.as_label().ok_or_else(|| {
                    TrackerError::malformed(format!("non-scalar entry in {class} list: {item:?}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(class, count = labels.len(), "listed tracker class");
        Ok(labels)
    }

    async fn lookup(&self, class: &str, label: &str) -> Result<String> {
        let value = self.call("lookup", &[class, label]).await?;
        value.as_label().ok_or_else(|| {
            TrackerError::malformed(format!("lookup {class}/{label} returned {value:?}")).into()
        })
    }

    async fn export_csv(&self) -> Result<Vec<u8>> {
        debug!(url = %self.csv_url, "downloading csv export");
        let start = Instant::now();
        let result = async {
            let request = self.http.get(self.csv_url.clone());
            let response = self.authorize(request).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(TrackerError::status(status, "csv export").into());
            }
            let body = response.bytes().await?;
            Ok::<_, anyhow::Error>(body.to_vec())
        }
        .await;
        metrics::observe("export_csv", result.is_ok(), start.elapsed().as_secs_f64());
        result
    }
}

fn csv_export_url(base: &Url) -> Result<Url> {
    let mut url = base.join("issue")?;
    url.query_pairs_mut()
        .append_pair("@action", "export_csv")
        .append_pair("@columns", &CSV_COLUMNS.join(","))
        .append_pair("@sort", "id")
        .append_pair("@filter", "id")
        .append_pair("id", "0-");
    Ok(url)
}
