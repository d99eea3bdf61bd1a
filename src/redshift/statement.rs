//! Statement targets and SQL rendering

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::s3::S3Url;

/// Identifier of a submitted statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementId(pub(crate) String);

impl StatementId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where statements run: a provisioned cluster or a serverless workgroup
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WarehouseEndpoint {
    Cluster { cluster_identifier: String },
    Serverless { workgroup_name: String },
}

/// A database to run statements against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTarget {
    pub(crate) endpoint: WarehouseEndpoint,
    pub(crate) database: String,
    pub(crate) db_user: Option<String>,
    pub(crate) secret_arn: Option<String>,
}

impl QueryTarget {
    /// Target a provisioned cluster.
    pub fn cluster(cluster_identifier: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            endpoint: WarehouseEndpoint::Cluster {
                cluster_identifier: cluster_identifier.into(),
            },
            database: database.into(),
            db_user: None,
            secret_arn: None,
        }
    }

    /// Target a serverless workgroup.
    pub fn serverless(workgroup_name: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            endpoint: WarehouseEndpoint::Serverless {
                workgroup_name: workgroup_name.into(),
            },
            database: database.into(),
            db_user: None,
            secret_arn: None,
        }
    }

    /// Authenticate as a database user (temporary credentials).
    pub fn with_db_user(mut self, db_user: impl Into<String>) -> Self {
        self.db_user = Some(db_user.into());
        self
    }

    /// Authenticate with a Secrets Manager secret.
    pub fn with_secret_arn(mut self, secret_arn: impl Into<String>) -> Self {
        self.secret_arn = Some(secret_arn.into());
        self
    }

    pub fn database(&self) -> &str {
        &self.database
    }
}

/// Data layout for COPY and UNLOAD transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Parquet,
}

/// Render the COPY statement loading a table from S3.
///
/// CSV sources are assumed to carry a header row, matching what
/// [`DataFrame::to_csv`](crate::frame::DataFrame::to_csv) writes.
pub fn copy_statement(table: &str, source: &S3Url, iam_role: &str, format: DataFormat) -> String {
    let options = match format {
        DataFormat::Csv => "FORMAT AS CSV IGNOREHEADER 1",
        DataFormat::Parquet => "FORMAT AS PARQUET",
    };
    format!(
        "COPY {} FROM '{}' IAM_ROLE '{}' {}",
        table,
        source.to_s3_url(),
        iam_role,
        options
    )
}

/// Render the UNLOAD statement writing a query result to S3.
pub fn unload_statement(query: &str, dest: &S3Url, iam_role: &str, format: DataFormat) -> String {
    let options = match format {
        DataFormat::Csv => "FORMAT AS CSV HEADER",
        DataFormat::Parquet => "FORMAT AS PARQUET",
    };
    format!(
        "UNLOAD ('{}') TO '{}' IAM_ROLE '{}' {}",
        escape_single_quotes(query),
        dest.to_s3_url(),
        iam_role,
        options
    )
}

/// Double embedded single quotes so the query survives UNLOAD's quoting
fn escape_single_quotes(sql: &str) -> String {
    sql.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROLE: &str = "arn:aws:iam::123456789012:role/warehouse";

    #[test]
    fn test_copy_statement_csv() {
        let source = S3Url::new("data-bucket", "exports/users.csv");
        let sql = copy_statement("public.users", &source, ROLE, DataFormat::Csv);
        assert_eq!(
            sql,
            "COPY public.users FROM 's3://data-bucket/exports/users.csv' \
             IAM_ROLE 'arn:aws:iam::123456789012:role/warehouse' FORMAT AS CSV IGNOREHEADER 1"
        );
    }

    #[test]
    fn test_copy_statement_parquet() {
        let source = S3Url::new("data-bucket", "exports/users/");
        let sql = copy_statement("public.users", &source, ROLE, DataFormat::Parquet);
        assert!(sql.ends_with("FORMAT AS PARQUET"));
        assert!(sql.contains("FROM 's3://data-bucket/exports/users/'"));
    }

    #[test]
    fn test_unload_statement_csv() {
        let dest = S3Url::new("data-bucket", "unload/users_");
        let sql = unload_statement("SELECT * FROM users", &dest, ROLE, DataFormat::Csv);
        assert_eq!(
            sql,
            "UNLOAD ('SELECT * FROM users') TO 's3://data-bucket/unload/users_' \
             IAM_ROLE 'arn:aws:iam::123456789012:role/warehouse' FORMAT AS CSV HEADER"
        );
    }

    #[test]
    fn test_unload_statement_escapes_quotes() {
        let dest = S3Url::new("data-bucket", "unload/active_");
        let sql = unload_statement(
            "SELECT * FROM users WHERE status = 'active'",
            &dest,
            ROLE,
            DataFormat::Parquet,
        );
        assert!(sql.contains("WHERE status = ''active''"));
    }

    #[test]
    fn test_query_target_builders() {
        let target = QueryTarget::cluster("analytics", "prod").with_db_user("etl");
        assert_eq!(target.database(), "prod");
        assert_eq!(target.db_user.as_deref(), Some("etl"));
        assert!(target.secret_arn.is_none());

        let target = QueryTarget::serverless("reporting", "prod")
            .with_secret_arn("arn:aws:secretsmanager:us-east-1:123456789012:secret:wh");
        assert!(matches!(
            target.endpoint,
            WarehouseEndpoint::Serverless { .. }
        ));
        assert!(target.secret_arn.is_some());
    }

    #[test]
    fn test_statement_id_display() {
        let id = StatementId("d9b6c0c9-0747-4bf4-b142-e8883122f766".to_string());
        assert_eq!(id.to_string(), id.as_str());
    }
}
