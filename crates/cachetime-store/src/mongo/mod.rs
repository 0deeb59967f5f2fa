//! MongoDB store implementation.

mod config;
mod document;

use std::future::IntoFuture;
use std::time::Duration;

use async_trait::async_trait;
use bson::doc;
use cachetime_core::{CacheTime, Page, PageRequest};
use futures::TryStreamExt;
use mongodb::options::{ClientOptions, Credential, ReadConcern, Tls, TlsOptions, WriteConcern};
use mongodb::{Client, Collection, Database};
use tracing::{debug, error, info};

pub use config::MongoConfig;
pub use document::{CacheTimeDocument, id_filter, id_sort, release_window_filter};

use crate::error::StoreError;
use crate::store::DataStore;

const APP_NAME: &str = "cachetime-registry";

/// Converts paging values to the driver's types, which stop at `i64::MAX`.
fn page_bounds(request: &PageRequest) -> Result<(u64, i64), StoreError> {
    let out_of_range = |field: &str| {
        StoreError::query("get_cache_times", format!("{} exceeds i64::MAX", field))
    };
    let skip = i64::try_from(request.offset).map_err(|_| out_of_range("offset"))?;
    let limit = i64::try_from(request.limit).map_err(|_| out_of_range("limit"))?;
    Ok((skip.unsigned_abs(), limit))
}

/// A [`DataStore`] backed by a MongoDB collection.
///
/// Every operation is bounded by the configured query timeout.
pub struct MongoStore {
    client: Client,
    database: Database,
    collection: Collection<CacheTimeDocument>,
    query_timeout: Duration,
}

impl MongoStore {
    /// Connects to MongoDB and verifies the connection with a ping.
    pub async fn connect(config: &MongoConfig) -> Result<Self, StoreError> {
        config.validate()?;

        let mut options = ClientOptions::parse(config.connection_uri())
            .await
            .map_err(|e| StoreError::InvalidConfig(e.to_string()))?;

        options.app_name = Some(APP_NAME.to_string());
        options.connect_timeout = Some(config.connect_timeout());
        options.server_selection_timeout = Some(config.connect_timeout());

        if let Some(replica_set) = config.replica_set() {
            options.repl_set_name = Some(replica_set.to_string());
        }
        if let Some((username, password)) = config.credentials() {
            options.credential = Some(
                Credential::builder()
                    .username(username.to_string())
                    .password(password.to_string())
                    .build(),
            );
        }
        if config.is_strong_read_concern_enabled() {
            options.read_concern = Some(ReadConcern::majority());
        }
        if config.is_write_concern_majority_enabled() {
            options.write_concern = Some(WriteConcern::majority());
        }
        if config.is_ssl() {
            options.tls = Some(Tls::Enabled(TlsOptions::default()));
        }

        let client =
            Client::with_options(options).map_err(|e| StoreError::unavailable(e.to_string()))?;
        let database = client.database(config.database());
        let collection = database.collection::<CacheTimeDocument>(config.collection());

        let store = Self {
            client,
            database,
            collection,
            query_timeout: config.query_timeout(),
        };

        store.ping().await?;

        info!(
            endpoint = config.cluster_endpoint(),
            database = config.database(),
            collection = config.collection(),
            "MongoDB store connected"
        );

        Ok(store)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        match tokio::time::timeout(
            self.query_timeout,
            self.database.run_command(doc! { "ping": 1 }).into_future(),
        )
        .await
        {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(StoreError::unavailable(e.to_string())),
            Err(_) => Err(StoreError::Timeout {
                operation: "ping",
                timeout: self.query_timeout,
            }),
        }
    }

    /// Runs a driver call under the query timeout, mapping driver errors.
    async fn run<T, F>(&self, operation: &'static str, call: F) -> Result<T, StoreError>
    where
        F: IntoFuture<Output = mongodb::error::Result<T>>,
    {
        match tokio::time::timeout(self.query_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!(operation, error = %e, "MongoDB operation failed");
                Err(StoreError::query(operation, e.to_string()))
            },
            Err(_) => {
                error!(operation, timeout = ?self.query_timeout, "MongoDB operation timed out");
                Err(StoreError::Timeout {
                    operation,
                    timeout: self.query_timeout,
                })
            },
        }
    }
}

#[async_trait]
impl DataStore for MongoStore {
    async fn get_cache_time(&self, id: &str) -> Result<CacheTime, StoreError> {
        let found = self
            .run("get_cache_time", self.collection.find_one(id_filter(id)))
            .await?;

        match found {
            Some(document) => Ok(document.into()),
            None => {
                debug!(id, "Cache time document not found");
                Err(StoreError::not_found(id))
            },
        }
    }

    async fn get_cache_times(&self, request: &PageRequest) -> Result<Page<CacheTime>, StoreError> {
        let filter = release_window_filter(request.release_window());
        let (skip, limit) = page_bounds(request)?;

        let total_count = self
            .run(
                "get_cache_times",
                self.collection.count_documents(filter.clone()),
            )
            .await?;

        let documents: Vec<CacheTimeDocument> = self
            .run("get_cache_times", async {
                let cursor = self
                    .collection
                    .find(filter)
                    .sort(id_sort())
                    .skip(skip)
                    .limit(limit)
                    .await?;
                cursor.try_collect::<Vec<_>>().await
            })
            .await?;

        debug!(
            returned = documents.len(),
            total_count, "Cache times listed"
        );

        Ok(Page::new(
            documents.into_iter().map(CacheTime::from).collect(),
            total_count as usize,
        ))
    }

    async fn upsert_cache_time(&self, cache_time: &CacheTime) -> Result<(), StoreError> {
        let document = CacheTimeDocument::from(cache_time);

        let result = self
            .run(
                "upsert_cache_time",
                self.collection
                    .replace_one(id_filter(&cache_time.id), &document)
                    .upsert(true),
            )
            .await?;

        debug!(
            id = %cache_time.id,
            matched = result.matched_count,
            inserted = result.upserted_id.is_some(),
            "Cache time upserted"
        );
        Ok(())
    }

    async fn check_health(&self) -> Result<(), StoreError> {
        self.ping().await
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.client.clone().shutdown().await;
        info!("MongoDB connection closed");
        Ok(())
    }

    fn name(&self) -> &str {
        "mongodb"
    }
}
