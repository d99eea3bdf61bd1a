//! Redshift Data API client wrapper

use std::time::Duration;

use aws_config::SdkConfig;
use aws_sdk_redshiftdata::types::{Field, StatusString};
use aws_sdk_redshiftdata::Client;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::frame::{Column, DataFrame};
use crate::redshift::statement::{
    copy_statement, unload_statement, DataFormat, QueryTarget, StatementId, WarehouseEndpoint,
};
use crate::s3::S3Url;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Redshift client wrapper with high-level operations
pub struct RedshiftClient {
    client: Client,
    target: QueryTarget,
    poll_interval: Duration,
}

impl RedshiftClient {
    /// Create a client from an already-resolved SDK configuration.
    pub fn new(config: &SdkConfig, target: QueryTarget) -> Self {
        Self {
            client: Client::new(config),
            target,
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Create a client from explicit connection settings.
    pub async fn with_config(config: ClientConfig, target: QueryTarget) -> Result<Self> {
        let sdk_config = config.resolve().await;
        Ok(Self::new(&sdk_config, target))
    }

    /// Create a client from environment credentials.
    pub async fn from_env(target: QueryTarget) -> Result<Self> {
        Self::with_config(ClientConfig::from_env()?, target).await
    }

    /// Override the status poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Submit a statement without waiting for it.
    pub async fn execute(&self, sql: &str) -> Result<StatementId> {
        let mut request = self
            .client
            .execute_statement()
            .database(&self.target.database)
            .sql(sql);

        request = match &self.target.endpoint {
            WarehouseEndpoint::Cluster { cluster_identifier } => {
                request.cluster_identifier(cluster_identifier)
            }
            WarehouseEndpoint::Serverless { workgroup_name } => {
                request.workgroup_name(workgroup_name)
            }
        };

        if let Some(db_user) = &self.target.db_user {
            request = request.db_user(db_user);
        }
        if let Some(secret_arn) = &self.target.secret_arn {
            request = request.secret_arn(secret_arn);
        }

        let response = request
            .send()
            .await
            .map_err(aws_sdk_redshiftdata::Error::from)?;

        let id = response
            .id()
            .ok_or_else(|| Error::Response("ExecuteStatement returned no statement id".into()))?;

        tracing::debug!(statement = id, "submitted statement");
        Ok(StatementId(id.to_string()))
    }

    /// Poll until the statement finishes. FAILED and ABORTED surface as
    /// [`Error::Statement`] with the server-side message.
    pub async fn wait(&self, id: &StatementId) -> Result<()> {
        loop {
            let response = self
                .client
                .describe_statement()
                .id(id.as_str())
                .send()
                .await
                .map_err(aws_sdk_redshiftdata::Error::from)?;

            match response.status() {
                Some(StatusString::Finished) => return Ok(()),
                Some(StatusString::Failed) => {
                    return Err(Error::Statement {
                        id: id.to_string(),
                        message: response.error().unwrap_or("unknown error").to_string(),
                    });
                }
                Some(StatusString::Aborted) => {
                    return Err(Error::Statement {
                        id: id.to_string(),
                        message: "statement was aborted".to_string(),
                    });
                }
                _ => tokio::time::sleep(self.poll_interval).await,
            }
        }
    }

    /// Fetch the result set of a finished statement, draining pagination.
    ///
    /// Statements without a result set (DDL, COPY, UNLOAD) come back as an
    /// empty frame with no columns.
    pub async fn fetch_result(&self, id: &StatementId) -> Result<DataFrame> {
        let mut columns: Vec<Column> = Vec::new();
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut request = self.client.get_statement_result().id(id.as_str());
            if let Some(token) = &next_token {
                request = request.next_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(aws_sdk_redshiftdata::Error::from)?;

            if columns.is_empty() {
                columns = response
                    .column_metadata()
                    .iter()
                    .enumerate()
                    .map(|(index, meta)| Column {
                        name: meta.name().unwrap_or_default().to_string(),
                        index,
                    })
                    .collect();
            }

            for record in response.records() {
                rows.push(record.iter().map(field_to_string).collect());
            }

            next_token = response.next_token().map(|s| s.to_string());
            if next_token.is_none() {
                break;
            }
        }

        tracing::debug!(statement = %id, rows = rows.len(), "fetched result set");
        Ok(DataFrame::from_parts(columns, rows))
    }

    /// Run a statement to completion and return its result set.
    pub async fn query(&self, sql: &str) -> Result<DataFrame> {
        let id = self.execute(sql).await?;
        self.wait(&id).await?;
        self.fetch_result(&id).await
    }

    /// Load a table from an S3 location via COPY.
    pub async fn copy_from_s3(
        &self,
        table: &str,
        source: &S3Url,
        iam_role: &str,
        format: DataFormat,
    ) -> Result<()> {
        let sql = copy_statement(table, source, iam_role, format);
        tracing::info!(table, source = %source, "loading table from S3");

        let id = self.execute(&sql).await?;
        self.wait(&id).await
    }

    /// Write a query result to an S3 location via UNLOAD.
    pub async fn unload_to_s3(
        &self,
        query: &str,
        dest: &S3Url,
        iam_role: &str,
        format: DataFormat,
    ) -> Result<()> {
        let sql = unload_statement(query, dest, iam_role, format);
        tracing::info!(dest = %dest, "unloading query result to S3");

        let id = self.execute(&sql).await?;
        self.wait(&id).await
    }
}

/// Render one result field as a string cell
fn field_to_string(field: &Field) -> String {
    match field {
        Field::IsNull(true) => "null".to_string(),
        Field::IsNull(false) => String::new(),
        Field::StringValue(v) => v.clone(),
        Field::LongValue(v) => v.to_string(),
        Field::DoubleValue(v) => v.to_string(),
        Field::BooleanValue(v) => v.to_string(),
        Field::BlobValue(blob) => blob
            .as_ref()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect(),
        _ => String::new(),
    }
}
