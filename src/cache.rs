use std::time::Duration;

use moka::future::Cache;

use crate::schemas::{BlogResponse, CartItemResponse, CommentResponse};

/// Every cached listing lives for ten minutes before it is recomputed.
pub const CACHE_TTL: Duration = Duration::from_secs(600);

const CACHE_CAPACITY: u64 = 1000;

/// Cache over the hot list reads, shared through `AppState`.
pub type ResponseCache = Cache<String, CachedData>;

pub fn build_cache() -> ResponseCache {
    Cache::builder()
        .max_capacity(CACHE_CAPACITY)
        .time_to_live(CACHE_TTL)
        .build()
}

/// Payloads stored in the cache, kept typed so a hit is returned verbatim.
#[derive(Clone, Debug)]
pub enum CachedData {
    Blogs(Vec<BlogResponse>),
    Comments(Vec<CommentResponse>),
    CartItems(Vec<CartItemResponse>),
}

/// The only way to name a cache entry.
///
/// Read and invalidation sites both go through this enum, so a listing can
/// never be populated under one key and deleted under another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKey {
    /// The unfiltered active-blogs listing.
    AllBlogs,
    /// Blogs of one product.
    ProductBlogs(i32),
    /// Comments of one blog.
    BlogComments(i32),
    /// One user's cart line items.
    UserCart(i32),
}

impl CacheKey {
    pub fn key(self) -> String {
        match self {
            CacheKey::AllBlogs => "blogs_list".to_string(),
            CacheKey::ProductBlogs(product_id) => format!("product_blogs_{product_id}"),
            CacheKey::BlogComments(blog_id) => format!("blog_comments_{blog_id}"),
            CacheKey::UserCart(user_id) => format!("user_cart_{user_id}"),
        }
    }

    /// Removes the entry so the next read recomputes from the database.
    pub async fn invalidate(self, cache: &ResponseCache) {
        cache.invalidate(&self.key()).await;
    }
}
