use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{BotIdentifier, FileContentType, OrderStatus};

/// Postgres takes OFFSET as a BIGINT.
pub const MAX_OFFSET: u64 = i64::MAX as u64;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self { page, per_page }
    }

    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1).saturating_mul(per_page);
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Price buckets offered by the catalog filter, in đồng.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
pub enum PriceRange {
    #[serde(rename = "under20k")]
    Under20k,
    #[serde(rename = "20k-40k")]
    From20kTo40k,
    #[serde(rename = "over40k")]
    Over40k,
}

impl PriceRange {
    /// Inclusive bounds matching the bucket.
    pub fn bounds(self) -> (Option<i64>, Option<i64>) {
        match self {
            PriceRange::Under20k => (None, Some(19_999)),
            PriceRange::From20kTo40k => (Some(20_000), Some(40_000)),
            PriceRange::Over40k => (Some(40_001), None),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    Newest,
    PriceLow,
    PriceHigh,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub q: Option<String>,
    /// Category name.
    pub category: Option<String>,
    pub location: Option<String>,
    pub price_range: Option<PriceRange>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub sort: Option<ProductSort>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<OrderStatus>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderScope {
    /// Orders still moving through the lifecycle.
    #[default]
    Active,
    /// Received or cancelled orders.
    Completed,
    All,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SellerOrderQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub scope: Option<OrderScope>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UploadQuery {
    pub user_id: Option<Uuid>,
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    pub content_type: Option<FileContentType>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Substring of the URL, case-insensitive.
    pub search: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub order: Option<SortOrder>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MessageQuery {
    pub receiver_id: Option<Uuid>,
    pub bot_receiver_id: Option<BotIdentifier>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl UploadQuery {
    /// `(limit, offset)` with the limit capped at `max_limit`.
    pub fn window(&self, max_limit: u64) -> (u64, u64) {
        let limit = self.limit.unwrap_or(20).clamp(1, max_limit);
        let offset = self.offset.unwrap_or(0).min(MAX_OFFSET);
        (limit, offset)
    }
}

impl MessageQuery {
    /// `(page, page_size, offset)`.
    pub fn window(&self) -> (u64, u64, u64) {
        let page = self.page.unwrap_or(1).clamp(1, MAX_OFFSET);
        let page_size = self.page_size.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1).saturating_mul(page_size).min(MAX_OFFSET);
        (page, page_size, offset)
    }
}

// Query strings are decoded by serde_urlencoded, which cannot feed numbers
// through `#[serde(flatten)]`, so paged queries carry the fields inline.
macro_rules! paged {
    ($($name:ident),+) => {
        $(impl $name {
            pub fn pagination(&self) -> Pagination {
                Pagination::new(self.page, self.per_page)
            }
        })+
    };
}

paged!(ProductQuery, OrderListQuery, SellerOrderQuery);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn huge_page_saturates_offset() {
        let (page, per_page, offset) = Pagination::new(Some(i64::MAX), Some(20)).normalize();
        assert_eq!(page, i64::MAX);
        assert_eq!(per_page, 20);
        assert_eq!(offset, i64::MAX);
    }

    #[test]
    fn page_defaults_and_bounds() {
        assert_eq!(Pagination::default().normalize(), (1, 20, 0));
        assert_eq!(Pagination::new(Some(-3), Some(1000)).normalize(), (1, 100, 0));
        assert_eq!(Pagination::new(Some(3), Some(10)).normalize(), (3, 10, 20));
    }

    #[test]
    fn message_window_stays_in_bigint_range() {
        let query = MessageQuery {
            page: Some(u64::MAX),
            page_size: Some(50),
            ..Default::default()
        };
        let (page, page_size, offset) = query.window();
        assert_eq!(page, MAX_OFFSET);
        assert_eq!(page_size, 50);
        assert_eq!(offset, MAX_OFFSET);
    }

    #[test]
    fn upload_offset_is_capped() {
        let query = UploadQuery {
            limit: Some(500),
            offset: Some(u64::MAX),
            ..Default::default()
        };
        assert_eq!(query.window(100), (100, MAX_OFFSET));
    }
}
