/// Property model, CRUD operations, and filtered search
///
/// A property is one real-estate listing. Search builds a conjunction of
/// optional predicates over the listing columns, so every filter the
/// client omits simply drops out of the WHERE clause.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE properties (
///     id BIGSERIAL PRIMARY KEY,
///     address TEXT NOT NULL,
///     description TEXT,
///     price DOUBLE PRECISION NOT NULL,
///     bedrooms INT NOT NULL,
///     bathrooms INT NOT NULL,
///     square_footage DOUBLE PRECISION NOT NULL,
///     rooms INT,
///     year_built INT,
///     lot_size DOUBLE PRECISION,
///     created_by TEXT,
///     last_modified_by TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use listings_shared::models::property::{
///     Property, PropertyFilter, PropertySort, SortDirection,
/// };
/// # use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let filter = PropertyFilter {
///     min_price: Some(100_000.0),
///     max_price: Some(250_000.0),
///     bedrooms: Some(3),
///     ..Default::default()
/// };
///
/// let page = Property::search(
///     &pool,
///     &filter,
///     PropertySort::Price,
///     SortDirection::Asc,
///     0,
///     12,
/// )
/// .await?;
/// println!("{} matches", page.total_elements);
/// # Ok(())
/// # }
/// ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::image::Image;
use super::page::Page;

/// Columns selected for every property query
const PROPERTY_COLUMNS: &str = "id, address, description, price, bedrooms, bathrooms, \
     square_footage, rooms, year_built, lot_size, created_by, last_modified_by, \
     created_at, updated_at";

/// Property model representing one listing
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Unique property ID
    pub id: i64,

    /// Street address, never blank
    pub address: String,

    /// Free-form listing description
    pub description: Option<String>,

    /// Asking price, always positive
    pub price: f64,

    /// Number of bedrooms, always positive
    pub bedrooms: i32,

    /// Number of bathrooms, always positive
    pub bathrooms: i32,

    /// Interior area in square feet, always positive
    pub square_footage: f64,

    /// Total room count, if known
    pub rooms: Option<i32>,

    /// Construction year, if known
    pub year_built: Option<i32>,

    /// Lot area in square feet, if known
    pub lot_size: Option<f64>,

    /// Username of the admin who created the listing
    pub created_by: Option<String>,

    /// Username of the admin who last modified the listing
    pub last_modified_by: Option<String>,

    /// When the listing was created
    pub created_at: DateTime<Utc>,

    /// When the listing was last updated
    pub updated_at: DateTime<Utc>,

    /// Images attached to this listing, loaded separately
    #[sqlx(skip)]
    pub images: Vec<Image>,
}

/// Listing fields supplied by create and update requests
///
/// The same shape is used for both operations; update is a full replace.
#[derive(Debug, Clone)]
pub struct PropertyData {
    pub address: String,
    pub description: Option<String>,
    pub price: f64,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub square_footage: f64,
    pub rooms: Option<i32>,
    pub year_built: Option<i32>,
    pub lot_size: Option<f64>,
}

/// Optional search predicates, combined conjunctively
///
/// A `None` field contributes no predicate at all.
#[derive(Debug, Clone, Default)]
pub struct PropertyFilter {
    /// Case-insensitive substring match on the address
    pub address: Option<String>,

    /// Lower price bound (inclusive)
    pub min_price: Option<f64>,

    /// Upper price bound (inclusive)
    pub max_price: Option<f64>,

    /// Lower square footage bound (inclusive)
    pub min_size: Option<f64>,

    /// Upper square footage bound (inclusive)
    pub max_size: Option<f64>,

    /// Exact bedroom count
    pub bedrooms: Option<i32>,

    /// Upper bedroom bound (inclusive)
    pub max_rooms: Option<i32>,

    /// Lower bathroom bound (inclusive)
    pub min_bathrooms: Option<i32>,

    /// Upper bathroom bound (inclusive)
    pub max_bathrooms: Option<i32>,
}

impl PropertyFilter {
    /// Whether any predicate is present
    pub fn is_empty(&self) -> bool {
        self.address.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.min_size.is_none()
            && self.max_size.is_none()
            && self.bedrooms.is_none()
            && self.max_rooms.is_none()
            && self.min_bathrooms.is_none()
            && self.max_bathrooms.is_none()
    }
}

/// Sortable columns for property search
///
/// Sorting is restricted to this whitelist; the column name is never taken
/// from user input directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropertySort {
    #[default]
    Id,
    Address,
    Price,
    Bedrooms,
    Bathrooms,
    SquareFootage,
}

impl PropertySort {
    /// Parses the wire name of a sort field (camelCase, as the clients send it)
    pub fn parse(field: &str) -> Option<Self> {
        match field {
            "id" => Some(Self::Id),
            "address" => Some(Self::Address),
            "price" => Some(Self::Price),
            "bedrooms" => Some(Self::Bedrooms),
            "bathrooms" => Some(Self::Bathrooms),
            "squareFootage" => Some(Self::SquareFootage),
            _ => None,
        }
    }

    /// SQL column backing this sort field
    pub fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Address => "address",
            Self::Price => "price",
            Self::Bedrooms => "bedrooms",
            Self::Bathrooms => "bathrooms",
            Self::SquareFootage => "square_footage",
        }
    }
}

/// Sort direction for property search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parses "asc"/"desc" (case-insensitive)
    pub fn parse(dir: &str) -> Option<Self> {
        match dir.to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    fn sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Appends the filter's predicates to a query as a WHERE clause
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &PropertyFilter) {
    let mut separator = " WHERE ";
    let mut push_sep = |builder: &mut QueryBuilder<'_, Postgres>| {
        builder.push(separator);
        separator = " AND ";
    };

    if let Some(ref address) = filter.address {
        push_sep(builder);
        builder
            .push("address ILIKE ")
            .push_bind(format!("%{}%", address));
    }
    if let Some(min_price) = filter.min_price {
        push_sep(builder);
        builder.push("price >= ").push_bind(min_price);
    }
    if let Some(max_price) = filter.max_price {
        push_sep(builder);
        builder.push("price <= ").push_bind(max_price);
    }
    if let Some(min_size) = filter.min_size {
        push_sep(builder);
        builder.push("square_footage >= ").push_bind(min_size);
    }
    if let Some(max_size) = filter.max_size {
        push_sep(builder);
        builder.push("square_footage <= ").push_bind(max_size);
    }
    if let Some(bedrooms) = filter.bedrooms {
        push_sep(builder);
        builder.push("bedrooms = ").push_bind(bedrooms);
    }
    if let Some(max_rooms) = filter.max_rooms {
        push_sep(builder);
        builder.push("bedrooms <= ").push_bind(max_rooms);
    }
    if let Some(min_bathrooms) = filter.min_bathrooms {
        push_sep(builder);
        builder.push("bathrooms >= ").push_bind(min_bathrooms);
    }
    if let Some(max_bathrooms) = filter.max_bathrooms {
        push_sep(builder);
        builder.push("bathrooms <= ").push_bind(max_bathrooms);
    }
}

impl Property {
    /// Creates a new property
    ///
    /// `created_by` is the authenticated admin's username, or None when
    /// authentication is disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if a database constraint rejects the data or the
    /// connection fails
    pub async fn create(
        pool: &PgPool,
        data: PropertyData,
        created_by: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        let property = sqlx::query_as::<_, Property>(&format!(
            r#"
            INSERT INTO properties
                (address, description, price, bedrooms, bathrooms, square_footage,
                 rooms, year_built, lot_size, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {PROPERTY_COLUMNS}
            "#
        ))
        .bind(data.address)
        .bind(data.description)
        .bind(data.price)
        .bind(data.bedrooms)
        .bind(data.bathrooms)
        .bind(data.square_footage)
        .bind(data.rooms)
        .bind(data.year_built)
        .bind(data.lot_size)
        .bind(created_by)
        .fetch_one(pool)
        .await?;

        Ok(property)
    }

    /// Finds a property by ID, with its images loaded
    ///
    /// # Returns
    ///
    /// The property if found, None otherwise
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let property = sqlx::query_as::<_, Property>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        match property {
            Some(mut property) => {
                property.images = Image::list_by_property(pool, property.id).await?;
                Ok(Some(property))
            }
            None => Ok(None),
        }
    }

    /// Checks whether a property exists
    pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM properties WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }

    /// Replaces all listing fields of an existing property
    ///
    /// `last_modified_by` is the authenticated admin's username, or None
    /// when authentication is disabled. `updated_at` is bumped as part of
    /// the same statement.
    ///
    /// # Returns
    ///
    /// The updated property (with images) if found, None otherwise
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: PropertyData,
        last_modified_by: Option<&str>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let property = sqlx::query_as::<_, Property>(&format!(
            r#"
            UPDATE properties
            SET address = $2, description = $3, price = $4, bedrooms = $5,
                bathrooms = $6, square_footage = $7, rooms = $8, year_built = $9,
                lot_size = $10, last_modified_by = $11, updated_at = NOW()
            WHERE id = $1
            RETURNING {PROPERTY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(data.address)
        .bind(data.description)
        .bind(data.price)
        .bind(data.bedrooms)
        .bind(data.bathrooms)
        .bind(data.square_footage)
        .bind(data.rooms)
        .bind(data.year_built)
        .bind(data.lot_size)
        .bind(last_modified_by)
        .fetch_optional(pool)
        .await?;

        match property {
            Some(mut property) => {
                property.images = Image::list_by_property(pool, property.id).await?;
                Ok(Some(property))
            }
            None => Ok(None),
        }
    }

    /// Deletes a property by ID
    ///
    /// Image rows are removed by the cascading foreign key; the caller is
    /// responsible for cleaning up the files on disk.
    ///
    /// # Returns
    ///
    /// True if a row was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Searches properties with optional filters, sorting, and pagination
    ///
    /// Every present filter becomes one predicate; absent filters are not
    /// part of the query at all. Results carry their images.
    ///
    /// # Arguments
    ///
    /// * `filter` - Optional predicates (see [`PropertyFilter`])
    /// * `sort` - Whitelisted sort column
    /// * `direction` - Sort direction
    /// * `page` - 0-based page index
    /// * `size` - Page size
    pub async fn search(
        pool: &PgPool,
        filter: &PropertyFilter,
        sort: PropertySort,
        direction: SortDirection,
        page: i64,
        size: i64,
    ) -> Result<Page<Self>, sqlx::Error> {
        // Total match count first, same predicates
        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM properties");
        push_filter(&mut count_builder, filter);
        let total_elements: i64 = count_builder
            .build_query_scalar()
            .fetch_one(pool)
            .await?;

        let mut builder =
            QueryBuilder::new(format!("SELECT {PROPERTY_COLUMNS} FROM properties"));
        push_filter(&mut builder, filter);

        // Sort column comes from the whitelist, never from user input
        builder.push(format!(" ORDER BY {} {}", sort.column(), direction.sql()));
        builder.push(" LIMIT ").push_bind(size);
        builder.push(" OFFSET ").push_bind(page * size);

        let mut properties: Vec<Property> =
            builder.build_query_as().fetch_all(pool).await?;

        Self::attach_images(pool, &mut properties).await?;

        Ok(Page::new(properties, total_elements, page, size))
    }

    /// Loads the images for a batch of properties in one query
    async fn attach_images(pool: &PgPool, properties: &mut [Property]) -> Result<(), sqlx::Error> {
        if properties.is_empty() {
            return Ok(());
        }

        let ids: Vec<i64> = properties.iter().map(|p| p.id).collect();
        let images = sqlx::query_as::<_, Image>(
            r#"
            SELECT id, file_name, content_type, url, property_id, created_at
            FROM images
            WHERE property_id = ANY($1)
            ORDER BY id ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;

        let mut by_property: HashMap<i64, Vec<Image>> = HashMap::new();
        for image in images {
            by_property.entry(image.property_id).or_default().push(image);
        }

        for property in properties.iter_mut() {
            property.images = by_property.remove(&property.id).unwrap_or_default();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered_sql(filter: &PropertyFilter) -> String {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM properties");
        push_filter(&mut builder, filter);
        builder.sql().to_string()
    }

    #[test]
    fn test_empty_filter_has_no_where_clause() {
        let filter = PropertyFilter::default();
        assert!(filter.is_empty());
        assert_eq!(rendered_sql(&filter), "SELECT COUNT(*) FROM properties");
    }

    #[test]
    fn test_single_filter_predicate() {
        let filter = PropertyFilter {
            min_price: Some(100_000.0),
            ..Default::default()
        };

        let sql = rendered_sql(&filter);
        assert!(sql.contains(" WHERE price >= $1"));
        assert!(!sql.contains(" AND "));
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let filter = PropertyFilter {
            address: Some("main st".to_string()),
            min_price: Some(50_000.0),
            max_price: Some(150_000.0),
            bedrooms: Some(3),
            ..Default::default()
        };

        let sql = rendered_sql(&filter);
        assert!(sql.contains("address ILIKE $1"));
        assert!(sql.contains("price >= $2"));
        assert!(sql.contains("price <= $3"));
        assert!(sql.contains("bedrooms = $4"));
        assert_eq!(sql.matches(" AND ").count(), 3);
        assert_eq!(sql.matches(" WHERE ").count(), 1);
    }

    #[test]
    fn test_size_bounds_target_square_footage() {
        let filter = PropertyFilter {
            min_size: Some(800.0),
            max_size: Some(2000.0),
            ..Default::default()
        };

        let sql = rendered_sql(&filter);
        assert!(sql.contains("square_footage >= $1"));
        assert!(sql.contains("square_footage <= $2"));
    }

    #[test]
    fn test_max_rooms_bounds_bedrooms() {
        // maxRooms caps the bedroom count, not the rooms column
        let filter = PropertyFilter {
            max_rooms: Some(5),
            ..Default::default()
        };

        assert!(rendered_sql(&filter).contains("bedrooms <= $1"));
    }

    #[test]
    fn test_sort_field_parsing() {
        assert_eq!(PropertySort::parse("price"), Some(PropertySort::Price));
        assert_eq!(
            PropertySort::parse("squareFootage"),
            Some(PropertySort::SquareFootage)
        );
        assert_eq!(PropertySort::parse("square_footage"), None);
        assert_eq!(PropertySort::parse("drop table"), None);
    }

    #[test]
    fn test_sort_direction_parsing() {
        assert_eq!(SortDirection::parse("asc"), Some(SortDirection::Asc));
        assert_eq!(SortDirection::parse("DESC"), Some(SortDirection::Desc));
        assert_eq!(SortDirection::parse("sideways"), None);
    }

    #[test]
    fn test_property_serializes_camel_case() {
        let property = Property {
            id: 1,
            address: "1 Main St".to_string(),
            description: None,
            price: 250_000.0,
            bedrooms: 3,
            bathrooms: 2,
            square_footage: 1400.0,
            rooms: Some(6),
            year_built: Some(1987),
            lot_size: None,
            created_by: Some("admin".to_string()),
            last_modified_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            images: vec![],
        };

        let json = serde_json::to_value(&property).unwrap();
        assert_eq!(json["squareFootage"], 1400.0);
        assert_eq!(json["yearBuilt"], 1987);
        assert_eq!(json["createdBy"], "admin");
        assert!(json["images"].as_array().unwrap().is_empty());
    }

    // Integration tests for database operations are in listings-api/tests/
}
