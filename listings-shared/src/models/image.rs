/// Image model and database operations
///
/// Each row describes one uploaded file living in the upload directory.
/// The owning property's back-reference is kept out of the serialized
/// output; clients only ever see `id`, `fileName`, `contentType` and `url`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE images (
///     id BIGSERIAL PRIMARY KEY,
///     file_name TEXT NOT NULL,
///     content_type TEXT NOT NULL,
///     url TEXT NOT NULL,
///     property_id BIGINT NOT NULL REFERENCES properties (id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

/// Content types accepted for upload
pub const ALLOWED_CONTENT_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Image model representing an uploaded file
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Unique image ID
    pub id: i64,

    /// Stored file name (UUID plus the original extension)
    pub file_name: String,

    /// MIME type recorded at upload time
    pub content_type: String,

    /// Public URL the file is served from
    pub url: String,

    /// Owning property, not exposed in responses
    #[serde(skip_serializing)]
    pub property_id: i64,

    /// When the image row was created, not exposed in responses
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new image row
#[derive(Debug, Clone)]
pub struct CreateImage {
    /// Stored file name
    pub file_name: String,

    /// MIME type
    pub content_type: String,

    /// Public URL
    pub url: String,

    /// Owning property
    pub property_id: i64,
}

impl Image {
    /// Whether the given MIME type is accepted for upload
    pub fn is_allowed_content_type(content_type: &str) -> bool {
        ALLOWED_CONTENT_TYPES.contains(&content_type)
    }

    /// Creates a new image row
    ///
    /// # Errors
    ///
    /// Returns an error if the owning property does not exist (foreign key
    /// violation) or the database connection fails
    pub async fn create(pool: &PgPool, data: CreateImage) -> Result<Self, sqlx::Error> {
        let image = sqlx::query_as::<_, Image>(
            r#"
            INSERT INTO images (file_name, content_type, url, property_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, file_name, content_type, url, property_id, created_at
            "#,
        )
        .bind(data.file_name)
        .bind(data.content_type)
        .bind(data.url)
        .bind(data.property_id)
        .fetch_one(pool)
        .await?;

        Ok(image)
    }

    /// Finds an image by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let image = sqlx::query_as::<_, Image>(
            r#"
            SELECT id, file_name, content_type, url, property_id, created_at
            FROM images
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(image)
    }

    /// Lists all images belonging to a property, oldest first
    pub async fn list_by_property(
        pool: &PgPool,
        property_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let images = sqlx::query_as::<_, Image>(
            r#"
            SELECT id, file_name, content_type, url, property_id, created_at
            FROM images
            WHERE property_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(property_id)
        .fetch_all(pool)
        .await?;

        Ok(images)
    }

    /// Deletes an image row by ID
    ///
    /// # Returns
    ///
    /// True if a row was deleted, false if it didn't exist. The caller is
    /// responsible for removing the file from disk.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_content_types() {
        assert!(Image::is_allowed_content_type("image/jpeg"));
        assert!(Image::is_allowed_content_type("image/png"));
        assert!(Image::is_allowed_content_type("image/gif"));
        assert!(Image::is_allowed_content_type("image/webp"));

        assert!(!Image::is_allowed_content_type("image/svg+xml"));
        assert!(!Image::is_allowed_content_type("application/pdf"));
        assert!(!Image::is_allowed_content_type("text/html"));
    }

    #[test]
    fn test_back_reference_not_serialized() {
        let image = Image {
            id: 7,
            file_name: "abc123.png".to_string(),
            content_type: "image/png".to_string(),
            url: "/api/images/abc123.png".to_string(),
            property_id: 42,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["fileName"], "abc123.png");
        assert_eq!(json["contentType"], "image/png");
        assert_eq!(json["url"], "/api/images/abc123.png");
        assert!(json.get("propertyId").is_none());
        assert!(json.get("createdAt").is_none());
    }

    // Integration tests for database operations are in listings-api/tests/
}
