use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, Method, RequestBuilder, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use types::{
    Account, Guardian, Result, Student,
    document::{Document, RunQueryItem},
};

use crate::Config;

const ACCOUNTS: &str = "users";

trait ReqwestExt {
    async fn try_send<T: DeserializeOwned>(self) -> Result<T>;
}

impl ReqwestExt for RequestBuilder {
    async fn try_send<T: DeserializeOwned>(self) -> Result<T> {
        let response = self
            .send()
            .await
            .context("document store request failed")?
            .error_for_status()
            .context("document store returned an error")?;
        let body = response
            .bytes()
            .await
            .context("failed to read document store response")?;

        Ok(serde_json::from_slice(&body).context("failed to parse document store response")?)
    }
}

/// Client for the Firestore REST API, scoped to one database.
#[derive(Clone)]
pub struct DocumentStore {
    client: Client,
    base_url: Url,
    documents: String,
    token: SecretString,
}

impl DocumentStore {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        let base_url = Url::parse(&config.firestore_url).context("invalid firestore_url")?;

        Ok(Self {
            client,
            base_url,
            documents: format!(
                "/v1/projects/{}/databases/{}/documents",
                config.project_id, config.database
            ),
            token: config.firestore_token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self
            .base_url
            .join(path)
            .with_context(|| format!("invalid document path {path}"))?;
        tracing::debug!(%method, %url, "document store request");

        Ok(self
            .client
            .request(method, url)
            .bearer_auth(self.token.expose_secret()))
    }

    async fn run_query(&self, query: Value) -> Result<Vec<Document>> {
        let items = self
            .request(Method::POST, &format!("{}:runQuery", self.documents))?
            .json(&query)
            .try_send::<Vec<RunQueryItem>>()
            .await?;

        Ok(items.into_iter().filter_map(|item| item.document).collect())
    }

    async fn query_accounts(&self, filters: &[(&str, &str)]) -> Result<Vec<Account>> {
        let mut accounts = self
            .run_query(accounts_query(filters))
            .await?
            .into_iter()
            .map(|doc| {
                let name = doc.name.clone();
                Account::try_from(doc).map_err(|e| types::err!("{e} in document {name}"))
            })
            .collect::<Result<Vec<_>>>()?;

        accounts.sort_unstable();
        Ok(accounts)
    }

    pub async fn list_guardians(&self, owner_id: &str) -> Result<Vec<Guardian>> {
        self.query_accounts(&[("role", "guardian"), ("ownerId", owner_id)])
            .await
    }

    pub async fn list_students(&self, guardian_id: &str) -> Result<Vec<Student>> {
        self.query_accounts(&[("role", "student"), ("guardianId", guardian_id)])
            .await
    }

    /// The guardian with account id `guardian_id` owned by `owner_id`, if any.
    ///
    /// Matches on [`Account::id`], so guardians stored under generated
    /// document names are found the same way the guardian list shows them.
    pub async fn find_owned_guardian(
        &self,
        guardian_id: &str,
        owner_id: &str,
    ) -> Result<Option<Guardian>> {
        let guardians = self.list_guardians(owner_id).await?;
        Ok(find_by_id(guardians, guardian_id))
    }
}

fn find_by_id(accounts: Vec<Account>, id: &str) -> Option<Account> {
    accounts.into_iter().find(|a| a.id == id)
}

/// Structured query selecting the accounts matching every `(field, value)` equality.
fn accounts_query(filters: &[(&str, &str)]) -> Value {
    let equals = |field: &str, value: &str| {
        json!({
            "fieldFilter": {
                "field": { "fieldPath": field },
                "op": "EQUAL",
                "value": { "stringValue": value }
            }
        })
    };

    json!({
        "structuredQuery": {
            "from": [{ "collectionId": ACCOUNTS }],
            "where": {
                "compositeFilter": {
                    "op": "AND",
                    "filters": filters
                        .iter()
                        .map(|(field, value)| equals(field, value))
                        .collect::<Vec<_>>()
                }
            }
        }
    })
}
