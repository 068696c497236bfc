//! Portfolio project repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use folio_core::{ProjectId, Slug};

use super::RepositoryError;
use crate::models::{Project, ValidProject};

const PROJECT_COLUMNS: &str = "id, slug, title, summary, body, tags, cover_image, repo_url, \
     live_url, featured, published, sort_order, created_at, updated_at";

const SLUG_TAKEN: &str = "another project already uses this slug";

/// Internal row type for `PostgreSQL` project queries.
#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    id: i64,
    slug: String,
    title: String,
    summary: String,
    body: String,
    tags: Vec<String>,
    cover_image: Option<String>,
    repo_url: Option<String>,
    live_url: Option<String>,
    featured: bool,
    published: bool,
    sort_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = RepositoryError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid slug on project {}: {e}", row.id))
        })?;

        Ok(Self {
            id: ProjectId::new(row.id),
            slug,
            title: row.title,
            summary: row.summary,
            body: row.body,
            tags: row.tags,
            cover_image: row.cover_image,
            repo_url: row.repo_url,
            live_url: row.live_url,
            featured: row.featured,
            published: row.published,
            sort_order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for portfolio projects.
pub struct ProjectRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProjectRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All projects in display order (`sort_order`, then newest).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Project>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM admin.project ORDER BY sort_order ASC, created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no project has this id.
    pub async fn get(&self, id: ProjectId) -> Result<Project, RepositoryError> {
        sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM admin.project WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?
        .try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(&self, project: &ValidProject) -> Result<Project, RepositoryError> {
        sqlx::query_as::<_, ProjectRow>(&format!(
            r"
            INSERT INTO admin.project
                (slug, title, summary, body, tags, cover_image, repo_url, live_url,
                 featured, published, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {PROJECT_COLUMNS}
            "
        ))
        .bind(project.slug.as_str())
        .bind(&project.title)
        .bind(&project.summary)
        .bind(&project.body)
        .bind(&project.tags)
        .bind(project.cover_image.as_deref())
        .bind(project.repo_url.as_deref())
        .bind(project.live_url.as_deref())
        .bind(project.featured)
        .bind(project.published)
        .bind(project.sort_order)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_violation(e, SLUG_TAKEN))?
        .try_into()
    }

    /// Replace every editable field of a project.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no project has this id, or
    /// `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update(
        &self,
        id: ProjectId,
        project: &ValidProject,
    ) -> Result<Project, RepositoryError> {
        sqlx::query_as::<_, ProjectRow>(&format!(
            r"
            UPDATE admin.project
            SET slug = $2, title = $3, summary = $4, body = $5, tags = $6,
                cover_image = $7, repo_url = $8, live_url = $9, featured = $10,
                published = $11, sort_order = $12, updated_at = NOW()
            WHERE id = $1
            RETURNING {PROJECT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(project.slug.as_str())
        .bind(&project.title)
        .bind(&project.summary)
        .bind(&project.body)
        .bind(&project.tags)
        .bind(project.cover_image.as_deref())
        .bind(project.repo_url.as_deref())
        .bind(project.live_url.as_deref())
        .bind(project.featured)
        .bind(project.published)
        .bind(project.sort_order)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_violation(e, SLUG_TAKEN))?
        .ok_or(RepositoryError::NotFound)?
        .try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no project has this id.
    pub async fn delete(&self, id: ProjectId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM admin.project WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
