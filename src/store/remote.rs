// src/store/remote.rs
//
// Client for the hosted record API. Routes used, per table:
//
//   POST   {base}/tables/{table}/records/query        list (fields + orderBy)
//   POST   {base}/tables/{table}/records/{id}/query   single record
//   POST   {base}/tables/{table}/records              create   { records }
//   PATCH  {base}/tables/{table}/records              update   { records }
//   DELETE {base}/tables/{table}/records              delete   { RecordIds }
//
// Every response is an envelope `{ success, message, data | results }`;
// writes answer with one `results` entry per submitted record.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, error};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::records::{
    category_get_query, category_list_query, task_get_query, task_list_query, CategoryFields,
    CategoryRecord, TaskFields, TaskRecord, CATEGORY_TABLE, TASK_TABLE,
};
use super::{BatchOutcome, RecordFailure, RecordStore};
use crate::config::RemoteConfig;
use crate::errors::StoreError;
use crate::models::{
    Category, CategoryId, CategoryUpdate, NewCategory, NewTask, Task, TaskId, TaskUpdate,
};

const PROJECT_HEADER: &str = "X-Project-Id";
const PUBLIC_KEY_HEADER: &str = "X-Public-Key";

#[derive(Debug, Deserialize)]
struct FetchResponse<T> {
    success: bool,
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct WriteResponse<T> {
    success: bool,
    message: Option<String>,
    results: Option<Vec<RecordResult<T>>>,
}

#[derive(Debug, Deserialize)]
struct RecordResult<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
    errors: Option<Vec<FieldMessage>>,
}

#[derive(Debug, Deserialize)]
struct FieldMessage {
    #[serde(rename = "fieldLabel")]
    field_label: Option<String>,
    message: Option<String>,
}

impl<T> RecordResult<T> {
    fn failure_message(&self) -> String {
        let mut parts: Vec<String> = self.message.iter().cloned().collect();
        for field in self.errors.iter().flatten() {
            match (&field.field_label, &field.message) {
                (Some(label), Some(message)) => parts.push(format!("{}: {}", label, message)),
                (None, Some(message)) => parts.push(message.clone()),
                _ => {}
            }
        }
        if parts.is_empty() {
            "record rejected".to_string()
        } else {
            parts.join("; ")
        }
    }
}

pub struct RemoteStore {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    public_key: String,
}

impl RemoteStore {
    pub fn new(config: &RemoteConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(RemoteStore {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            public_key: config.public_key.clone(),
        })
    }

    fn records_url(&self, table: &str) -> String {
        format!("{}/tables/{}/records", self.base_url, table)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(PROJECT_HEADER, &self.project_id)
            .header(PUBLIC_KEY_HEADER, &self.public_key)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Option<T>, StoreError> {
        let resp = request.send().await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(StoreError::rejected(format!("HTTP {}: {}", status.as_u16(), text)));
        }
        Ok(Some(resp.json::<T>().await?))
    }

    async fn fetch<R: DeserializeOwned>(&self, table: &str, query: Value) -> Result<Vec<R>, StoreError> {
        debug!("Fetching {} records", table);
        let url = format!("{}/query", self.records_url(table));
        let response: FetchResponse<Vec<R>> = self
            .send(self.request(Method::POST, &url).json(&query))
            .await?
            .ok_or_else(|| StoreError::rejected(format!("table {} not found", table)))?;
        if !response.success {
            return Err(StoreError::rejected(
                response.message.unwrap_or_else(|| format!("Failed to fetch {}", table)),
            ));
        }
        Ok(response.data.unwrap_or_default())
    }

    async fn fetch_one<R: DeserializeOwned>(
        &self,
        table: &str,
        id: i64,
        query: Value,
    ) -> Result<Option<R>, StoreError> {
        debug!("Fetching {} record {}", table, id);
        let url = format!("{}/{}/query", self.records_url(table), id);
        let Some(response) = self
            .send::<FetchResponse<R>>(self.request(Method::POST, &url).json(&query))
            .await?
        else {
            return Ok(None);
        };
        if !response.success {
            // a refused lookup of a single id means "no such record"
            debug!(
                "Lookup of {} {} refused: {}",
                table,
                id,
                response.message.unwrap_or_default()
            );
            return Ok(None);
        }
        Ok(response.data)
    }

    async fn write<F: Serialize, R: DeserializeOwned>(
        &self,
        method: Method,
        table: &str,
        records: Vec<F>,
    ) -> Result<BatchOutcome<R>, StoreError> {
        if records.is_empty() {
            return Ok(BatchOutcome::default());
        }
        let body = json!({ "records": records });
        let response: WriteResponse<R> = self
            .send(self.request(method, &self.records_url(table)).json(&body))
            .await?
            .ok_or_else(|| StoreError::rejected(format!("table {} not found", table)))?;
        Self::collect(table, response)
    }

    async fn remove(&self, table: &str, ids: Vec<i64>) -> Result<BatchOutcome<i64>, StoreError> {
        if ids.is_empty() {
            return Ok(BatchOutcome::default());
        }
        let body = json!({ "RecordIds": ids });
        let response: WriteResponse<Value> = self
            .send(self.request(Method::DELETE, &self.records_url(table)).json(&body))
            .await?
            .ok_or_else(|| StoreError::rejected(format!("table {} not found", table)))?;

        let outcome = Self::collect(table, response)?;
        let outcome = self.mark_missing(table, &ids, outcome).await;
        // deletions echo nothing useful; report the ids that went through
        let failed_indexes: Vec<usize> = outcome.failed.iter().map(|f| f.index).collect();
        let succeeded = ids
            .iter()
            .enumerate()
            .filter(|(index, _)| !failed_indexes.contains(index))
            .map(|(_, id)| *id)
            .collect();
        Ok(BatchOutcome {
            succeeded,
            failed: outcome.failed,
        })
    }

    /// Refusals carry free text only. Each refused id is looked up, and the
    /// ones the store no longer has are reported as missing.
    async fn mark_missing<T>(
        &self,
        table: &str,
        ids: &[i64],
        mut outcome: BatchOutcome<T>,
    ) -> BatchOutcome<T> {
        for failure in outcome.failed.iter_mut() {
            let Some(&id) = ids.get(failure.index) else {
                continue;
            };
            let query = json!({ "fields": [{ "field": { "Name": "Id" } }] });
            if let Ok(None) = self.fetch_one::<Value>(table, id, query).await {
                failure.missing_id = Some(id);
            }
        }
        outcome
    }

    fn collect<R>(table: &str, response: WriteResponse<R>) -> Result<BatchOutcome<R>, StoreError> {
        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| format!("Failed to write {} records", table));
            error!("{}", message);
            return Err(StoreError::rejected(message));
        }

        let results = response.results.ok_or_else(|| StoreError::Decode {
            message: format!("write to {} returned no results", table),
        })?;

        let mut outcome = BatchOutcome::default();
        for (index, result) in results.into_iter().enumerate() {
            if result.success {
                // delete results carry no data; `remove` rebuilds the ids
                if let Some(data) = result.data {
                    outcome.succeeded.push(data);
                }
            } else {
                outcome.failed.push(RecordFailure {
                    index,
                    message: result.failure_message(),
                    missing_id: None,
                });
            }
        }
        Ok(outcome)
    }
}

#[async_trait]
impl RecordStore for RemoteStore {
    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let records: Vec<TaskRecord> = self.fetch(TASK_TABLE, task_list_query()).await?;
        Ok(records.into_iter().map(Task::from).collect())
    }

    async fn get_task(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        let record: Option<TaskRecord> = self.fetch_one(TASK_TABLE, id, task_get_query()).await?;
        Ok(record.map(Task::from))
    }

    async fn create_tasks(&self, tasks: Vec<NewTask>) -> Result<BatchOutcome<Task>, StoreError> {
        let now = Utc::now();
        let fields: Vec<TaskFields> = tasks
            .iter()
            .map(|task| TaskFields::for_create(task, now))
            .collect();
        let outcome: BatchOutcome<TaskRecord> =
            self.write(Method::POST, TASK_TABLE, fields).await?;
        Ok(outcome.map(Task::from))
    }

    async fn update_tasks(
        &self,
        updates: Vec<(TaskId, TaskUpdate)>,
    ) -> Result<BatchOutcome<Task>, StoreError> {
        let now = Utc::now();
        let ids: Vec<TaskId> = updates.iter().map(|(id, _)| *id).collect();
        let fields: Vec<TaskFields> = updates
            .iter()
            .map(|(id, update)| TaskFields::for_update(*id, update, now))
            .collect();
        let outcome: BatchOutcome<TaskRecord> =
            self.write(Method::PATCH, TASK_TABLE, fields).await?;
        let outcome = self.mark_missing(TASK_TABLE, &ids, outcome).await;
        Ok(outcome.map(Task::from))
    }

    async fn delete_tasks(&self, ids: Vec<TaskId>) -> Result<BatchOutcome<TaskId>, StoreError> {
        self.remove(TASK_TABLE, ids).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let records: Vec<CategoryRecord> = self.fetch(CATEGORY_TABLE, category_list_query()).await?;
        Ok(records.into_iter().map(Category::from).collect())
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        let record: Option<CategoryRecord> = self
            .fetch_one(CATEGORY_TABLE, id, category_get_query())
            .await?;
        Ok(record.map(Category::from))
    }

    async fn create_categories(
        &self,
        categories: Vec<NewCategory>,
    ) -> Result<BatchOutcome<Category>, StoreError> {
        let fields: Vec<CategoryFields> = categories.iter().map(CategoryFields::from).collect();
        let outcome: BatchOutcome<CategoryRecord> =
            self.write(Method::POST, CATEGORY_TABLE, fields).await?;
        Ok(outcome.map(Category::from))
    }

    async fn update_categories(
        &self,
        updates: Vec<(CategoryId, CategoryUpdate)>,
    ) -> Result<BatchOutcome<Category>, StoreError> {
        let ids: Vec<CategoryId> = updates.iter().map(|(id, _)| *id).collect();
        let fields: Vec<CategoryFields> = updates
            .iter()
            .map(|(id, update)| CategoryFields::for_update(*id, update))
            .collect();
        let outcome: BatchOutcome<CategoryRecord> =
            self.write(Method::PATCH, CATEGORY_TABLE, fields).await?;
        let outcome = self.mark_missing(CATEGORY_TABLE, &ids, outcome).await;
        Ok(outcome.map(Category::from))
    }

    async fn delete_categories(
        &self,
        ids: Vec<CategoryId>,
    ) -> Result<BatchOutcome<CategoryId>, StoreError> {
        self.remove(CATEGORY_TABLE, ids).await
    }
}
