use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, types::Json, QueryBuilder, Sqlite};

use super::StoreError;
use crate::models::{
    service::{ListServicesFilter, Service, ServiceId, ServiceWithVersions, UpdateServicePayload},
    user::UserId,
    version::Version,
};

const SERVICE_COLUMNS: &str = "id, created_at, updated_at, name, description, versions, user_id";
const VERSION_COLUMNS: &str = "id, created_at, updated_at, version, service_id, changelog";

/// Owner-scoped access to services and their versions.
///
/// Every lookup filters on `user_id`, so a service belonging to someone else
/// is reported as [`StoreError::NotFound`].
#[derive(Clone)]
pub struct CatalogStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct ServiceVersionRow {
    service_id: ServiceId,
    service_created_at: DateTime<Utc>,
    service_updated_at: DateTime<Utc>,
    name: String,
    description: String,
    user_id: UserId,
    version_id: Option<i64>,
    version_created_at: Option<DateTime<Utc>>,
    version_updated_at: Option<DateTime<Utc>>,
    version: Option<String>,
    changelog: Option<String>,
}

impl CatalogStore {
    pub fn new(pool: SqlitePool) -> Self {
        CatalogStore { pool }
    }

    pub async fn list(
        &self,
        owner_id: UserId,
        filter: &ListServicesFilter,
    ) -> Result<Vec<Service>, StoreError> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE user_id = "
        ));
        query.push_bind(owner_id);

        if let Some(name) = filter.name.as_deref().filter(|n| !n.is_empty()) {
            // instr keeps the match case-sensitive, unlike LIKE in SQLite
            query.push(" AND instr(name, ").push_bind(name.to_owned()).push(") > 0");
        }

        match filter.sort_key {
            Some(key) => {
                query.push(" ORDER BY ").push(key.column());
                if filter.descending {
                    query.push(" DESC");
                }
                query.push(", id");
            }
            None => {
                query.push(" ORDER BY id");
            }
        }

        if filter.limit > 0 {
            query
                .push(" LIMIT ")
                .push_bind(i64::from(filter.limit))
                .push(" OFFSET ")
                .push_bind(i64::from(filter.offset));
        }

        let services = query
            .build_query_as::<Service>()
            .fetch_all(&self.pool)
            .await?;
        Ok(services)
    }

    pub async fn get(&self, id: ServiceId, owner_id: UserId) -> Result<Service, StoreError> {
        sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE id = ? AND user_id = ?"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    /// Loads a service together with its version rows in one join.
    pub async fn get_with_versions(
        &self,
        id: ServiceId,
        owner_id: UserId,
    ) -> Result<ServiceWithVersions, StoreError> {
        let rows = sqlx::query_as::<_, ServiceVersionRow>(
            "SELECT services.id AS service_id, \
                    services.created_at AS service_created_at, \
                    services.updated_at AS service_updated_at, \
                    services.name, services.description, services.user_id, \
                    versions.id AS version_id, \
                    versions.created_at AS version_created_at, \
                    versions.updated_at AS version_updated_at, \
                    versions.version, versions.changelog \
             FROM services \
             LEFT JOIN versions ON versions.service_id = services.id \
             WHERE services.id = ? AND services.user_id = ? \
             ORDER BY versions.id",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        let first = rows.first().ok_or(StoreError::NotFound)?;
        let mut service = ServiceWithVersions {
            id: first.service_id,
            created_at: first.service_created_at,
            updated_at: first.service_updated_at,
            name: first.name.clone(),
            description: first.description.clone(),
            user_id: first.user_id,
            versions: Vec::with_capacity(rows.len()),
        };

        for row in rows {
            if let (Some(version_id), Some(created_at), Some(updated_at), Some(version)) = (
                row.version_id,
                row.version_created_at,
                row.version_updated_at,
                row.version,
            ) {
                service.versions.push(Version {
                    id: version_id,
                    created_at,
                    updated_at,
                    version,
                    service_id: row.service_id,
                    changelog: row.changelog.unwrap_or_default(),
                });
            }
        }

        Ok(service)
    }

    pub async fn create(
        &self,
        owner_id: UserId,
        name: &str,
        description: &str,
    ) -> Result<Service, StoreError> {
        let now = Utc::now();
        let service = sqlx::query_as::<_, Service>(&format!(
            "INSERT INTO services (name, description, versions, user_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {SERVICE_COLUMNS}"
        ))
        .bind(name)
        .bind(description)
        .bind(Json(Vec::<String>::new()))
        .bind(owner_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(service_id = service.id, user_id = owner_id, "service created");
        Ok(service)
    }

    /// Applies the non-empty fields of `patch` and returns the updated row.
    pub async fn update(
        &self,
        id: ServiceId,
        owner_id: UserId,
        patch: &UpdateServicePayload,
    ) -> Result<Service, StoreError> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE services SET updated_at = ");
        query.push_bind(Utc::now());
        if !patch.name.is_empty() {
            query.push(", name = ").push_bind(patch.name.clone());
        }
        if !patch.description.is_empty() {
            query
                .push(", description = ")
                .push_bind(patch.description.clone());
        }
        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND user_id = ")
            .push_bind(owner_id)
            .push(format!(" RETURNING {SERVICE_COLUMNS}"));

        query
            .build_query_as::<Service>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    /// Inserts a version and appends it to the service's version list.
    ///
    /// Both writes happen in one transaction; on any error neither is kept.
    pub async fn create_version(
        &self,
        service_id: ServiceId,
        owner_id: UserId,
        version: &str,
        changelog: &str,
    ) -> Result<Version, StoreError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // The first statement is a write so the transaction holds SQLite's write
        // lock before it reads the version list. A deferred read upgraded to a
        // write later fails with SQLITE_BUSY instead of waiting.
        let service = sqlx::query_as::<_, Service>(&format!(
            "UPDATE services SET updated_at = ? WHERE id = ? AND user_id = ? \
             RETURNING {SERVICE_COLUMNS}"
        ))
        .bind(now)
        .bind(service_id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;

        let created = sqlx::query_as::<_, Version>(&format!(
            "INSERT INTO versions (version, changelog, service_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING {VERSION_COLUMNS}"
        ))
        .bind(version)
        .bind(changelog)
        .bind(service.id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let Json(mut versions) = service.versions;
        versions.push(created.version.clone());

        sqlx::query("UPDATE services SET versions = ? WHERE id = ?")
            .bind(Json(versions))
            .bind(service.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(
            service_id = service.id,
            version_id = created.id,
            "version created"
        );
        Ok(created)
    }
}
