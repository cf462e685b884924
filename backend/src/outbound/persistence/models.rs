//! Row types bridging Diesel and the domain model.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{AuditEntry, Classification, DomainName, DomainRecord};

use super::schema::{audit_logs, domain_lists};

/// Read model for one `domain_lists` row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = domain_lists)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DomainListRow {
    pub id: Uuid,
    pub domain: String,
    pub list: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DomainListRow {
    /// Convert a row to a domain record.
    ///
    /// Rows are written from validated domain values, so a failure here
    /// means the table was mutated outside the application; the row is
    /// reported as corrupt rather than silently skipped.
    pub fn into_record(self) -> Result<DomainRecord, String> {
        let domain = DomainName::new(&self.domain)
            .map_err(|error| format!("corrupt domain {:?}: {error}", self.domain))?;
        let classification = self
            .list
            .parse::<Classification>()
            .map_err(|error| format!("corrupt classification for {domain}: {error}"))?;
        Ok(DomainRecord {
            domain,
            classification,
        })
    }
}

/// Insert model for one `domain_lists` row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = domain_lists)]
pub struct NewDomainListRow {
    pub id: Uuid,
    pub domain: String,
    pub list: String,
}

impl NewDomainListRow {
    /// Build an insert row from a domain record.
    pub fn from_record(record: &DomainRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            domain: record.domain.as_str().to_owned(),
            list: record.classification.as_str().to_owned(),
        }
    }
}

/// Read model for one `audit_logs` row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = audit_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AuditLogRow {
    pub id: Uuid,
    pub email: String,
    pub domain: String,
    pub ip: Option<String>,
    pub action: String,
    pub recorded_at: DateTime<Utc>,
}

impl From<AuditLogRow> for AuditEntry {
    fn from(row: AuditLogRow) -> Self {
        Self {
            email: row.email,
            domain: row.domain,
            ip: row.ip,
            action: row.action,
            recorded_at: row.recorded_at,
        }
    }
}

/// Insert model for one `audit_logs` row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_logs)]
pub struct NewAuditLogRow {
    pub id: Uuid,
    pub email: String,
    pub domain: String,
    pub ip: Option<String>,
    pub action: String,
}
