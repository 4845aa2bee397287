//! Catalog service client: products and categories, cached.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use mercadito_core::{Category, CategoryId, Product, ProductId};

use super::{SharedStore, auth_headers, guard_session, send_json};
use crate::error::Result;
use crate::normalize::{derive_categories, normalize_category_list, normalize_product_list};
use crate::session::SessionContext;

const CACHE_TTL: Duration = Duration::from_secs(300);
const CACHE_CAPACITY: u64 = 64;

const PRODUCTS_KEY: &str = "products:all";
const CATEGORIES_KEY: &str = "categories:all";

fn category_key(id: CategoryId) -> String {
    format!("category:{id}:products")
}

#[derive(Clone)]
enum CacheValue {
    Products(Vec<Product>),
    Categories(Vec<Category>),
}

/// Fields accepted by the catalog's product mutations, spelled the way
/// the catalog service spells them.
#[derive(Debug, Clone, Serialize)]
pub struct ProductInput {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "precio")]
    pub price: Decimal,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "nombreMarca")]
    pub brand: String,
    #[serde(rename = "urlImagen")]
    pub image_url: String,
}

/// Client for the catalog service.
///
/// Listings are cached for five minutes; product mutations invalidate
/// the cache so the next listing reflects them.
#[derive(Clone)]
pub struct CatalogApi {
    inner: Arc<Inner>,
}

struct Inner {
    client: reqwest::Client,
    base: String,
    session: Arc<SessionContext<SharedStore>>,
    cache: moka::future::Cache<String, CacheValue>,
}

impl CatalogApi {
    pub(crate) fn new(
        client: reqwest::Client,
        base: &Url,
        session: Arc<SessionContext<SharedStore>>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                base: base.as_str().trim_end_matches('/').to_string(),
                session,
                cache: moka::future::Cache::builder()
                    .max_capacity(CACHE_CAPACITY)
                    .time_to_live(CACHE_TTL)
                    .build(),
            }),
        }
    }

    async fn get(&self, url: String) -> Result<Value> {
        let request = self
            .inner
            .client
            .get(url)
            .headers(auth_headers(&self.inner.session));
        send_json(request)
            .await
            .map_err(|e| guard_session(&self.inner.session, e))
    }

    /// All products, normalized. Served from cache when fresh.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(PRODUCTS_KEY).await {
            debug!("cache hit for product list");
            return Ok(products);
        }

        let body = self.get(format!("{}/productos/detalles", self.inner.base)).await?;
        let products = normalize_product_list(&body);
        debug!(count = products.len(), "fetched product list");

        self.inner
            .cache
            .insert(PRODUCTS_KEY.to_string(), CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// One product by id, looked up in the full listing.
    ///
    /// The backend has no stable single-product endpoint across builds, so
    /// this rides the cached listing.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let products = self.list_products().await?;
        Ok(products.into_iter().find(|p| p.id == id))
    }

    /// Case-insensitive substring search over name, description, brand and
    /// category. Runs client-side against the full listing.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Product>> {
        let needle = query.trim().to_lowercase();
        let products = self.list_products().await?;
        if needle.is_empty() {
            return Ok(products);
        }

        Ok(products
            .into_iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
                    || p.brand.to_lowercase().contains(&needle)
                    || p.category.to_lowercase().contains(&needle)
            })
            .collect())
    }

    /// All categories from the category endpoint, duplicates preserved.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(CATEGORIES_KEY).await
        {
            debug!("cache hit for category list");
            return Ok(categories);
        }

        let body = self
            .get(format!("{}/categorias/listarCategorias", self.inner.base))
            .await?;
        let categories = normalize_category_list(&body);

        self.inner
            .cache
            .insert(
                CATEGORIES_KEY.to_string(),
                CacheValue::Categories(categories.clone()),
            )
            .await;
        Ok(categories)
    }

    /// Distinct category names for filter chips.
    ///
    /// Prefers the category endpoint; when it fails or comes back empty the
    /// names are derived from the product listing instead, so the filter UI
    /// still renders on backends without a category route.
    #[instrument(skip(self))]
    pub async fn category_names(&self) -> Vec<String> {
        match self.list_categories().await {
            Ok(categories) if !categories.is_empty() => {
                let mut names: Vec<String> = categories
                    .into_iter()
                    .map(|c| c.name)
                    .filter(|n| !n.is_empty())
                    .collect();
                names.sort();
                names.dedup();
                if !names.is_empty() {
                    return names;
                }
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "category endpoint failed, deriving from products"),
        }

        match self.list_products().await {
            Ok(products) => derive_categories(&products),
            Err(e) => {
                warn!(error = %e, "product listing failed, no categories available");
                Vec::new()
            }
        }
    }

    /// Products belonging to one category.
    #[instrument(skip(self))]
    pub async fn products_by_category(&self, id: CategoryId) -> Result<Vec<Product>> {
        let key = category_key(id);
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            debug!("cache hit for category products");
            return Ok(products);
        }

        let body = self.get(format!("{}/categorias/{id}", self.inner.base)).await?;
        let products = normalize_product_list(&body);

        self.inner
            .cache
            .insert(key, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// Create a product under a category.
    #[instrument(skip(self, product))]
    pub async fn create_product(
        &self,
        category_id: CategoryId,
        product: &ProductInput,
    ) -> Result<()> {
        let request = self
            .inner
            .client
            .post(format!("{}/categorias/{category_id}", self.inner.base))
            .headers(auth_headers(&self.inner.session))
            .json(product);

        send_json(request)
            .await
            .map_err(|e| guard_session(&self.inner.session, e))?;
        self.invalidate();
        Ok(())
    }

    /// Replace a product's fields.
    #[instrument(skip(self, product))]
    pub async fn update_product(&self, id: ProductId, product: &ProductInput) -> Result<()> {
        let request = self
            .inner
            .client
            .put(format!("{}/productos/{id}", self.inner.base))
            .headers(auth_headers(&self.inner.session))
            .json(product);

        send_json(request)
            .await
            .map_err(|e| guard_session(&self.inner.session, e))?;
        self.invalidate();
        Ok(())
    }

    /// Delete a product.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        let request = self
            .inner
            .client
            .delete(format!("{}/productos/{id}", self.inner.base))
            .headers(auth_headers(&self.inner.session));

        send_json(request)
            .await
            .map_err(|e| guard_session(&self.inner.session, e))?;
        self.invalidate();
        Ok(())
    }

    /// Drop all cached listings.
    pub fn invalidate(&self) {
        self.inner.cache.invalidate_all();
    }
}
