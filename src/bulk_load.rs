//! CSV loading of the code registry.
//!
//! Every loader reads a headed CSV (`name,code` plus a parent column for
//! sublocations and subcategories), skips rows whose code already exists under
//! the same parent (locations and categories also skip a taken name) and
//! inserts the rest in one transaction. Loading the same file twice inserts
//! nothing the second time.

use crate::{
    db::DbPool,
    entities::{category, location, sub_category, sub_location},
    errors::ServiceError,
    serial_number::validate_code,
    services::registry::{
        find_category_by_code, find_category_by_name, find_location_by_code,
        find_location_by_name, find_subcategory_by_code, find_sublocation_by_code, MAX_NAME_LEN,
    },
};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, Set, TransactionTrait,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum BulkLoadError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl From<sea_orm::DbErr> for BulkLoadError {
    fn from(err: sea_orm::DbErr) -> Self {
        BulkLoadError::Service(err.into())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub inserted: usize,
    pub skipped_existing: usize,
    pub skipped_invalid: usize,
}

impl LoadReport {
    pub fn total(&self) -> usize {
        self.inserted + self.skipped_existing + self.skipped_invalid
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} inserted, {} already present, {} invalid",
            self.inserted, self.skipped_existing, self.skipped_invalid
        )
    }
}

#[derive(Debug, Deserialize)]
struct CodeRow {
    name: String,
    code: String,
}

#[derive(Debug, Deserialize)]
struct SubLocationRow {
    name: String,
    code: String,
    #[serde(default)]
    location_code: Option<String>,
    #[serde(default)]
    location_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct SubCategoryRow {
    name: String,
    code: String,
    #[serde(default)]
    category_code: Option<String>,
    #[serde(default)]
    category_id: Option<i32>,
}

/// Parses every record, counting the ones that fail to deserialize or to
/// validate.
fn parse_rows<T, R>(
    reader: R,
    what: &str,
    report: &mut LoadReport,
    valid: impl Fn(&T) -> bool,
) -> Result<Vec<T>, BulkLoadError>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    // Missing or unreadable headers fail the whole file
    csv_reader.headers()?;

    let mut rows = Vec::new();
    for (index, record) in csv_reader.deserialize::<T>().enumerate() {
        // +2: one-based and the header line
        let line = index + 2;
        match record {
            Ok(row) if valid(&row) => rows.push(row),
            Ok(_) => {
                warn!(line, "Skipping invalid {} row", what);
                report.skipped_invalid += 1;
            }
            Err(e) => {
                warn!(line, error = %e, "Skipping malformed {} row", what);
                report.skipped_invalid += 1;
            }
        }
    }
    Ok(rows)
}

fn valid_entry(name: &str, code: &str) -> bool {
    let name = name.trim();
    !name.is_empty() && name.chars().count() <= MAX_NAME_LEN && validate_code(code).is_ok()
}

async fn in_transaction<F, T>(db: &DbPool, f: F) -> Result<T, BulkLoadError>
where
    F: for<'c> FnOnce(
            &'c DatabaseTransaction,
        ) -> std::pin::Pin<
            Box<dyn std::future::Future<Output = Result<T, BulkLoadError>> + Send + 'c>,
        > + Send,
    T: Send,
{
    db.transaction::<_, T, BulkLoadError>(f)
        .await
        .map_err(|e| match e {
            sea_orm::TransactionError::Connection(db_err) => db_err.into(),
            sea_orm::TransactionError::Transaction(err) => err,
        })
}

pub async fn load_locations<R: Read>(db: &DbPool, reader: R) -> Result<LoadReport, BulkLoadError> {
    let mut report = LoadReport::default();
    let rows: Vec<CodeRow> =
        parse_rows(reader, "location", &mut report, |r: &CodeRow| valid_entry(&r.name, &r.code))?;

    let report = in_transaction(db, move |txn| {
        Box::pin(async move {
            let mut report = report;
            for row in rows {
                // Names are unique too; a new code under a taken name is skipped
                if find_location_by_code(txn, &row.code).await?.is_some()
                    || find_location_by_name(txn, &row.name).await?.is_some()
                {
                    report.skipped_existing += 1;
                    continue;
                }
                location::ActiveModel {
                    name: Set(row.name),
                    code: Set(row.code),
                    ..Default::default()
                }
                .insert(txn)
                .await?;
                report.inserted += 1;
            }
            Ok(report)
        })
    })
    .await?;

    info!(%report, "Locations loaded");
    Ok(report)
}

pub async fn load_categories<R: Read>(db: &DbPool, reader: R) -> Result<LoadReport, BulkLoadError> {
    let mut report = LoadReport::default();
    let rows: Vec<CodeRow> =
        parse_rows(reader, "category", &mut report, |r: &CodeRow| valid_entry(&r.name, &r.code))?;

    let report = in_transaction(db, move |txn| {
        Box::pin(async move {
            let mut report = report;
            for row in rows {
                if find_category_by_code(txn, &row.code).await?.is_some()
                    || find_category_by_name(txn, &row.name).await?.is_some()
                {
                    report.skipped_existing += 1;
                    continue;
                }
                category::ActiveModel {
                    name: Set(row.name),
                    code: Set(row.code),
                    ..Default::default()
                }
                .insert(txn)
                .await?;
                report.inserted += 1;
            }
            Ok(report)
        })
    })
    .await?;

    info!(%report, "Categories loaded");
    Ok(report)
}

async fn resolve_location<C: ConnectionTrait>(
    conn: &C,
    code: Option<&str>,
    id: Option<i32>,
) -> Result<Option<location::Model>, BulkLoadError> {
    match (code.filter(|c| !c.is_empty()), id) {
        (Some(code), _) => Ok(find_location_by_code(conn, code).await?),
        (None, Some(id)) => Ok(location::Entity::find_by_id(id).one(conn).await?),
        (None, None) => Ok(None),
    }
}

async fn resolve_category<C: ConnectionTrait>(
    conn: &C,
    code: Option<&str>,
    id: Option<i32>,
) -> Result<Option<category::Model>, BulkLoadError> {
    match (code.filter(|c| !c.is_empty()), id) {
        (Some(code), _) => Ok(find_category_by_code(conn, code).await?),
        (None, Some(id)) => Ok(category::Entity::find_by_id(id).one(conn).await?),
        (None, None) => Ok(None),
    }
}

/// Parent is named by `location_code` or, failing that, `location_id`.
pub async fn load_sublocations<R: Read>(
    db: &DbPool,
    reader: R,
) -> Result<LoadReport, BulkLoadError> {
    let mut report = LoadReport::default();
    let rows: Vec<SubLocationRow> =
        parse_rows(reader, "sublocation", &mut report, |r: &SubLocationRow| {
            valid_entry(&r.name, &r.code)
        })?;

    let report = in_transaction(db, move |txn| {
        Box::pin(async move {
            let mut report = report;
            for row in rows {
                let Some(parent) =
                    resolve_location(txn, row.location_code.as_deref(), row.location_id).await?
                else {
                    warn!(code = %row.code, "Skipping sublocation with unknown location");
                    report.skipped_invalid += 1;
                    continue;
                };

                if find_sublocation_by_code(txn, parent.id, &row.code)
                    .await?
                    .is_some()
                {
                    report.skipped_existing += 1;
                    continue;
                }
                sub_location::ActiveModel {
                    name: Set(row.name),
                    code: Set(row.code),
                    location_id: Set(parent.id),
                    ..Default::default()
                }
                .insert(txn)
                .await?;
                report.inserted += 1;
            }
            Ok(report)
        })
    })
    .await?;

    info!(%report, "Sublocations loaded");
    Ok(report)
}

/// Parent is named by `category_code` or, failing that, `category_id`.
pub async fn load_subcategories<R: Read>(
    db: &DbPool,
    reader: R,
) -> Result<LoadReport, BulkLoadError> {
    let mut report = LoadReport::default();
    let rows: Vec<SubCategoryRow> =
        parse_rows(reader, "subcategory", &mut report, |r: &SubCategoryRow| {
            valid_entry(&r.name, &r.code)
        })?;

    let report = in_transaction(db, move |txn| {
        Box::pin(async move {
            let mut report = report;
            for row in rows {
                let Some(parent) =
                    resolve_category(txn, row.category_code.as_deref(), row.category_id).await?
                else {
                    warn!(code = %row.code, "Skipping subcategory with unknown category");
                    report.skipped_invalid += 1;
                    continue;
                };

                if find_subcategory_by_code(txn, parent.id, &row.code)
                    .await?
                    .is_some()
                {
                    report.skipped_existing += 1;
                    continue;
                }
                sub_category::ActiveModel {
                    name: Set(row.name),
                    code: Set(row.code),
                    category_id: Set(parent.id),
                    ..Default::default()
                }
                .insert(txn)
                .await?;
                report.inserted += 1;
            }
            Ok(report)
        })
    })
    .await?;

    info!(%report, "Subcategories loaded");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_counts_invalid_and_malformed_rows() {
        let csv = "name,code\nHeadquarters,HQ\n,EMPTY\nBranch,BR-2\nWarehouse\nYard , YARD \n";
        let mut report = LoadReport::default();
        let rows: Vec<CodeRow> = parse_rows(csv.as_bytes(), "location", &mut report, |r: &CodeRow| {
            valid_entry(&r.name, &r.code)
        })
        .unwrap();

        let codes: Vec<&str> = rows.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["HQ", "YARD"]);
        assert_eq!(report.skipped_invalid, 3);
    }

    #[test]
    fn parent_columns_are_optional() {
        let csv = "name,code,location_id\nRoom 1,RM1,1\nRoom 2,RM2,\n";
        let mut report = LoadReport::default();
        let rows: Vec<SubLocationRow> =
            parse_rows(csv.as_bytes(), "sublocation", &mut report, |_: &SubLocationRow| true)
                .unwrap();
        assert_eq!(rows[0].location_id, Some(1));
        assert_eq!(rows[1].location_id, None);
        assert!(rows[0].location_code.is_none());
    }

    #[test]
    fn report_display() {
        let report = LoadReport {
            inserted: 3,
            skipped_existing: 1,
            skipped_invalid: 2,
        };
        assert_eq!(report.total(), 6);
        assert_eq!(report.to_string(), "3 inserted, 1 already present, 2 invalid");
    }
}
