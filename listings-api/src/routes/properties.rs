/// Property listing endpoints
///
/// CRUD plus paginated, filtered search. Reads are public; mutations sit
/// behind the admin auth layer.
///
/// # Endpoints
///
/// - `GET    /api/properties` - Search with optional filters
/// - `GET    /api/properties/:id` - Fetch one listing
/// - `POST   /api/properties` - Create listing (admin)
/// - `PUT    /api/properties/:id` - Replace listing (admin)
/// - `DELETE /api/properties/:id` - Delete listing (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use listings_shared::{
    auth::middleware::AuthContext,
    models::{
        page::Page,
        property::{Property, PropertyData, PropertyFilter, PropertySort, SortDirection},
    },
};
use serde::Deserialize;
use std::str::FromStr;

/// Default page size when the client sends none
const DEFAULT_PAGE_SIZE: i64 = 12;

/// Upper bound on the page size a client may request
const MAX_PAGE_SIZE: i64 = 100;

/// Search query parameters
///
/// Everything arrives as an optional string: a number the client sends
/// that does not parse is ignored rather than rejected, so a stray
/// filter value never breaks the whole search.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub address: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_size: Option<String>,
    pub max_size: Option<String>,
    pub bedrooms: Option<String>,
    pub max_rooms: Option<String>,
    pub min_bathrooms: Option<String>,
    pub max_bathrooms: Option<String>,
    pub page: Option<String>,
    pub size: Option<String>,
    /// `field,dir` pair, e.g. `price,desc`
    pub sort: Option<String>,
}

/// Listing fields for create and update requests
///
/// Required fields are optional here so that a missing field surfaces as
/// a field-level validation message instead of a deserialization failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRequest {
    pub address: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub square_footage: Option<f64>,
    pub rooms: Option<i32>,
    pub year_built: Option<i32>,
    pub lot_size: Option<f64>,
}

impl PropertyRequest {
    /// Validates the request, producing the listing data on success
    fn into_data(self) -> Result<PropertyData, ApiError> {
        let mut errors = Vec::new();

        let address = self.address.map(|a| a.trim().to_string()).filter(|a| !a.is_empty());
        if address.is_none() {
            errors.push(ValidationErrorDetail {
                field: "address".to_string(),
                message: "Address is required".to_string(),
            });
        }

        if !self.price.is_some_and(|p| p > 0.0) {
            errors.push(ValidationErrorDetail {
                field: "price".to_string(),
                message: "Price must be greater than 0".to_string(),
            });
        }

        if !self.bedrooms.is_some_and(|b| b > 0) {
            errors.push(ValidationErrorDetail {
                field: "bedrooms".to_string(),
                message: "Number of bedrooms must be greater than 0".to_string(),
            });
        }

        if !self.bathrooms.is_some_and(|b| b > 0) {
            errors.push(ValidationErrorDetail {
                field: "bathrooms".to_string(),
                message: "Number of bathrooms must be greater than 0".to_string(),
            });
        }

        if !self.square_footage.is_some_and(|s| s > 0.0) {
            errors.push(ValidationErrorDetail {
                field: "squareFootage".to_string(),
                message: "Square footage must be greater than 0".to_string(),
            });
        }

        if !errors.is_empty() {
            return Err(ApiError::ValidationError(errors));
        }

        // Defaults are unreachable here; every required field was checked
        Ok(PropertyData {
            address: address.unwrap_or_default(),
            description: self.description,
            price: self.price.unwrap_or_default(),
            bedrooms: self.bedrooms.unwrap_or_default(),
            bathrooms: self.bathrooms.unwrap_or_default(),
            square_footage: self.square_footage.unwrap_or_default(),
            rooms: self.rooms,
            year_built: self.year_built,
            lot_size: self.lot_size,
        })
    }
}

/// Parses an optional numeric parameter, silently dropping garbage
fn parse_lenient<T: FromStr>(value: &Option<String>) -> Option<T> {
    value.as_deref().and_then(|v| v.trim().parse().ok())
}

impl SearchParams {
    /// Builds the filter, rejecting inverted or negative ranges
    fn filter(&self) -> Result<PropertyFilter, ApiError> {
        let filter = PropertyFilter {
            address: self
                .address
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(String::from),
            min_price: parse_lenient(&self.min_price),
            max_price: parse_lenient(&self.max_price),
            min_size: parse_lenient(&self.min_size),
            max_size: parse_lenient(&self.max_size),
            bedrooms: parse_lenient(&self.bedrooms),
            max_rooms: parse_lenient(&self.max_rooms),
            min_bathrooms: parse_lenient(&self.min_bathrooms),
            max_bathrooms: parse_lenient(&self.max_bathrooms),
        };

        if filter.min_price.is_some_and(|p| p < 0.0) {
            return Err(ApiError::BadRequest(
                "Minimum price cannot be negative".to_string(),
            ));
        }
        if filter.max_price.is_some_and(|p| p < 0.0) {
            return Err(ApiError::BadRequest(
                "Maximum price cannot be negative".to_string(),
            ));
        }
        if let (Some(min), Some(max)) = (filter.min_price, filter.max_price) {
            if max < min {
                return Err(ApiError::BadRequest(
                    "Maximum price must be greater than or equal to minimum price".to_string(),
                ));
            }
        }

        if filter.min_size.is_some_and(|s| s < 0.0) {
            return Err(ApiError::BadRequest(
                "Minimum size cannot be negative".to_string(),
            ));
        }
        if filter.max_size.is_some_and(|s| s < 0.0) {
            return Err(ApiError::BadRequest(
                "Maximum size cannot be negative".to_string(),
            ));
        }
        if let (Some(min), Some(max)) = (filter.min_size, filter.max_size) {
            if max < min {
                return Err(ApiError::BadRequest(
                    "Maximum size must be greater than or equal to minimum size".to_string(),
                ));
            }
        }

        if filter.bedrooms.is_some_and(|b| b < 0) {
            return Err(ApiError::BadRequest(
                "Number of bedrooms cannot be negative".to_string(),
            ));
        }

        if let (Some(min), Some(max)) = (filter.min_bathrooms, filter.max_bathrooms) {
            if max < min {
                return Err(ApiError::BadRequest(
                    "Maximum bathrooms must be greater than or equal to minimum bathrooms"
                        .to_string(),
                ));
            }
        }

        Ok(filter)
    }

    /// 0-based page index, defaulting to the first page
    fn page(&self) -> i64 {
        parse_lenient::<i64>(&self.page).unwrap_or(0).max(0)
    }

    /// Page size, defaulted and capped
    fn size(&self) -> i64 {
        parse_lenient::<i64>(&self.size)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Parses `sort=field,dir`, falling back to `id,asc`
    ///
    /// Unknown fields and directions take their defaults rather than
    /// erroring, like the other query parameters.
    fn sort(&self) -> (PropertySort, SortDirection) {
        let mut parts = self.sort.as_deref().unwrap_or("").splitn(2, ',');

        let field = parts
            .next()
            .and_then(|f| PropertySort::parse(f.trim()))
            .unwrap_or_default();
        let direction = parts
            .next()
            .and_then(|d| SortDirection::parse(d.trim()))
            .unwrap_or_default();

        (field, direction)
    }
}

/// Paginated property search
///
/// All filters are optional and combine conjunctively. Unparseable
/// numeric parameters are ignored; inverted ranges are a 400.
///
/// # Endpoint
///
/// ```text
/// GET /api/properties?address=main&minPrice=100000&maxPrice=250000&page=0&size=12
/// ```
pub async fn search_properties(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Page<Property>>> {
    let filter = params.filter()?;
    let (sort, direction) = params.sort();

    let page = Property::search(
        &state.db,
        &filter,
        sort,
        direction,
        params.page(),
        params.size(),
    )
    .await?;

    Ok(Json(page))
}

/// Fetches one listing by ID, with its images
///
/// # Errors
///
/// - `404 Not Found`: No listing with that ID
pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Property>> {
    let property = Property::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property", id))?;

    Ok(Json(property))
}

/// Creates a new listing (admin)
///
/// The authenticated admin's username is recorded on the listing. With
/// the auth gate disabled there is no context and no audit user.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401/403`: Handled by the auth layer
pub async fn create_property(
    State(state): State<AppState>,
    auth: Option<Extension<AuthContext>>,
    Json(req): Json<PropertyRequest>,
) -> ApiResult<Json<Property>> {
    let data = req.into_data()?;
    let created_by = auth.as_ref().map(|Extension(ctx)| ctx.username.as_str());

    let property = Property::create(&state.db, data, created_by).await?;

    tracing::info!(id = property.id, "Created property");

    Ok(Json(property))
}

/// Replaces all listing fields of an existing listing (admin)
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `404 Not Found`: No listing with that ID
pub async fn update_property(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: Option<Extension<AuthContext>>,
    Json(req): Json<PropertyRequest>,
) -> ApiResult<Json<Property>> {
    let data = req.into_data()?;
    let modified_by = auth.as_ref().map(|Extension(ctx)| ctx.username.as_str());

    let property = Property::update(&state.db, id, data, modified_by)
        .await?
        .ok_or_else(|| ApiError::not_found("Property", id))?;

    tracing::info!(id = property.id, "Updated property");

    Ok(Json(property))
}

/// Deletes a listing (admin)
///
/// Image rows go with the listing via the cascading foreign key; their
/// files are removed from disk best-effort afterwards.
///
/// # Errors
///
/// - `404 Not Found`: No listing with that ID
pub async fn delete_property(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    // Collect filenames before the rows cascade away
    let images = listings_shared::models::image::Image::list_by_property(&state.db, id).await?;

    let deleted = Property::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::not_found("Property", id));
    }

    for image in &images {
        if let Err(e) = state.images.delete(&image.file_name).await {
            tracing::warn!(file = %image.file_name, error = %e, "Failed to remove image file");
        }
    }

    tracing::info!(id, "Deleted property");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> SearchParams {
        let query = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        serde_urlencoded::from_str(&query).unwrap()
    }

    #[test]
    fn test_unparseable_numbers_are_ignored() {
        let p = params(&[("minPrice", "cheap"), ("bedrooms", "three")]);
        let filter = p.filter().unwrap();

        assert!(filter.min_price.is_none());
        assert!(filter.bedrooms.is_none());
        assert!(filter.is_empty());
    }

    #[test]
    fn test_inverted_price_range_rejected() {
        let p = params(&[("minPrice", "200000"), ("maxPrice", "100000")]);
        let err = p.filter().unwrap_err();

        match err {
            ApiError::BadRequest(msg) => {
                assert_eq!(
                    msg,
                    "Maximum price must be greater than or equal to minimum price"
                );
            }
            other => panic!("expected BadRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_price_rejected() {
        let p = params(&[("minPrice", "-1")]);
        match p.filter() {
            Err(ApiError::BadRequest(msg)) => {
                assert_eq!(msg, "Minimum price cannot be negative");
            }
            other => panic!("expected BadRequest, got {:?}", other),
        }

        let p = params(&[("maxPrice", "-1")]);
        match p.filter() {
            Err(ApiError::BadRequest(msg)) => {
                assert_eq!(msg, "Maximum price cannot be negative");
            }
            other => panic!("expected BadRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_bedrooms_rejected() {
        let p = params(&[("bedrooms", "-2")]);
        match p.filter() {
            Err(ApiError::BadRequest(msg)) => {
                assert_eq!(msg, "Number of bedrooms cannot be negative");
            }
            other => panic!("expected BadRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_inverted_size_range_rejected() {
        let p = params(&[("minSize", "2000"), ("maxSize", "800")]);
        assert!(matches!(p.filter(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_paging_defaults_and_caps() {
        let p = params(&[]);
        assert_eq!(p.page(), 0);
        assert_eq!(p.size(), DEFAULT_PAGE_SIZE);

        let p = params(&[("page", "-3"), ("size", "10000")]);
        assert_eq!(p.page(), 0);
        assert_eq!(p.size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_sort_parses_field_dir_pair() {
        let p = params(&[("sort", "price,desc")]);
        assert_eq!(p.sort(), (PropertySort::Price, SortDirection::Desc));

        // Direction is optional
        let p = params(&[("sort", "bedrooms")]);
        assert_eq!(p.sort(), (PropertySort::Bedrooms, SortDirection::Asc));
    }

    #[test]
    fn test_sort_defaults_for_unknown_fields() {
        let p = params(&[("sort", "ohno,sideways")]);
        assert_eq!(p.sort(), (PropertySort::Id, SortDirection::Asc));

        let p = params(&[]);
        assert_eq!(p.sort(), (PropertySort::Id, SortDirection::Asc));
    }

    #[test]
    fn test_blank_address_filter_is_dropped() {
        let p = params(&[("address", "%20%20")]);
        assert!(p.filter().unwrap().address.is_none());
    }

    #[test]
    fn test_request_validation_messages() {
        let req = PropertyRequest {
            address: Some("  ".to_string()),
            description: None,
            price: Some(0.0),
            bedrooms: None,
            bathrooms: Some(-1),
            square_footage: Some(100.0),
            rooms: None,
            year_built: None,
            lot_size: None,
        };

        match req.into_data() {
            Err(ApiError::ValidationError(details)) => {
                let messages: Vec<&str> =
                    details.iter().map(|d| d.message.as_str()).collect();
                assert!(messages.contains(&"Address is required"));
                assert!(messages.contains(&"Price must be greater than 0"));
                assert!(messages.contains(&"Number of bedrooms must be greater than 0"));
                assert!(messages.contains(&"Number of bathrooms must be greater than 0"));
                assert!(!messages.contains(&"Square footage must be greater than 0"));
            }
            other => panic!("expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        let req = PropertyRequest {
            address: Some("1 Main St".to_string()),
            description: Some("Cozy".to_string()),
            price: Some(250_000.0),
            bedrooms: Some(3),
            bathrooms: Some(2),
            square_footage: Some(1400.0),
            rooms: Some(6),
            year_built: Some(1987),
            lot_size: None,
        };

        let data = req.into_data().unwrap();
        assert_eq!(data.address, "1 Main St");
        assert_eq!(data.bedrooms, 3);
    }
}
