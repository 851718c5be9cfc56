//! # Catalog Repository
//!
//! Read access to categories, products and variants, plus the insert
//! helpers the seed binary and tests use.
//!
//! ## Listing Semantics
//! `list_products` only returns listed products (`in_stock = 1`), newest
//! first, each with its variants and category attached - the shape the
//! storefront product grid renders directly.

use pharma_core::{Category, Product, ProductVariant};
use serde::Serialize;
use sqlx::{QueryBuilder, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;

// =============================================================================
// Query Inputs
// =============================================================================

/// Filters for the product listing. All optional and combinable.
#[derive(Debug, Clone, Default)]
pub struct ProductFilters {
    /// Restrict to one category by slug.
    pub category_slug: Option<String>,
    /// Case-insensitive substring match on name or description.
    pub search: Option<String>,
    /// When true, only featured products.
    pub featured: bool,
    /// Cap on the number of products returned.
    pub limit: Option<i64>,
}

/// A product with its variants and category, as listed on the storefront.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    #[serde(flatten)]
    pub product: Product,
    pub variants: Vec<ProductVariant>,
    pub category: Category,
}

// =============================================================================
// Insert Inputs (seed + tests)
// =============================================================================

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub sort_order: i64,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub category_id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub short_description: Option<String>,
    pub images: Vec<String>,
    pub base_price_cents: i64,
    pub featured: bool,
}

#[derive(Debug, Clone)]
pub struct NewVariant {
    pub product_id: String,
    pub name: String,
    pub strength: Option<String>,
    pub pack_size: i64,
    pub price_cents: i64,
    pub compare_at_price_cents: Option<i64>,
    pub stock: i64,
    pub sku: Option<String>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog reads and seed-time inserts.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Lists in-stock products matching the filters, newest first, with
    /// variants (cheapest first) and category attached.
    pub async fn list_products(&self, filters: &ProductFilters) -> DbResult<Vec<ProductListing>> {
        let mut qb: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(
            "SELECT p.* FROM products p JOIN categories c ON c.id = p.category_id \
             WHERE p.in_stock = 1",
        );

        if let Some(slug) = &filters.category_slug {
            qb.push(" AND c.slug = ");
            qb.push_bind(slug.as_str());
        }

        if let Some(search) = &filters.search {
            let pattern = format!("%{}%", search);
            qb.push(" AND (p.name LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR p.description LIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }

        if filters.featured {
            qb.push(" AND p.featured = 1");
        }

        qb.push(" ORDER BY p.created_at DESC");

        if let Some(limit) = filters.limit {
            qb.push(" LIMIT ");
            qb.push_bind(limit);
        }

        let products: Vec<Product> = qb.build_query_as().fetch_all(&self.pool).await?;

        debug!(count = products.len(), "Product listing query");

        let mut listings = Vec::with_capacity(products.len());
        for product in products {
            let variants = self.variants_for_product(&product.id).await?;
            let category = self.category_by_id(&product.category_id).await?;
            listings.push(ProductListing {
                product,
                variants,
                category,
            });
        }

        Ok(listings)
    }

    /// Variants for one product, cheapest first.
    pub async fn variants_for_product(&self, product_id: &str) -> DbResult<Vec<ProductVariant>> {
        let variants = sqlx::query_as::<_, ProductVariant>(
            "SELECT * FROM product_variants WHERE product_id = ?1 ORDER BY price_cents ASC",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(variants)
    }

    async fn category_by_id(&self, category_id: &str) -> DbResult<Category> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?1")
            .bind(category_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(category)
    }

    /// Inserts a category (seed/tests).
    pub async fn insert_category(&self, new: NewCategory) -> DbResult<Category> {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            slug: new.slug,
            description: new.description,
            image: new.image,
            sort_order: new.sort_order,
            created_at: chrono::Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, slug, description, image, sort_order, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(&category.image)
        .bind(category.sort_order)
        .bind(category.created_at)
        .execute(&self.pool)
        .await?;

        Ok(category)
    }

    /// Inserts a product, listed by default (seed/tests).
    pub async fn insert_product(&self, new: NewProduct) -> DbResult<Product> {
        let now = chrono::Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            category_id: new.category_id,
            name: new.name,
            slug: new.slug,
            description: new.description,
            short_description: new.short_description,
            images: serde_json::to_string(&new.images).unwrap_or_else(|_| "[]".to_string()),
            base_price_cents: new.base_price_cents,
            in_stock: true,
            featured: new.featured,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO products (
                id, category_id, name, slug, description, short_description,
                images, base_price_cents, in_stock, featured, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&product.id)
        .bind(&product.category_id)
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.description)
        .bind(&product.short_description)
        .bind(&product.images)
        .bind(product.base_price_cents)
        .bind(product.in_stock)
        .bind(product.featured)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a variant (seed/tests).
    pub async fn insert_variant(&self, new: NewVariant) -> DbResult<ProductVariant> {
        let now = chrono::Utc::now();
        let variant = ProductVariant {
            id: Uuid::new_v4().to_string(),
            product_id: new.product_id,
            name: new.name,
            strength: new.strength,
            pack_size: new.pack_size,
            price_cents: new.price_cents,
            compare_at_price_cents: new.compare_at_price_cents,
            stock: new.stock,
            sku: new.sku,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO product_variants (
                id, product_id, name, strength, pack_size, price_cents,
                compare_at_price_cents, stock, sku, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&variant.id)
        .bind(&variant.product_id)
        .bind(&variant.name)
        .bind(&variant.strength)
        .bind(variant.pack_size)
        .bind(variant.price_cents)
        .bind(variant.compare_at_price_cents)
        .bind(variant.stock)
        .bind(&variant.sku)
        .bind(variant.created_at)
        .bind(variant.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(variant)
    }

    /// Number of categories, used by the seed binary to stay idempotent.
    pub async fn category_count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn seeded_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog = db.catalog();

        let pain = catalog
            .insert_category(NewCategory {
                name: "Pain Relief".into(),
                slug: "pain-relief".into(),
                description: None,
                image: None,
                sort_order: 1,
            })
            .await
            .unwrap();
        let sleep = catalog
            .insert_category(NewCategory {
                name: "Sleep Aids".into(),
                slug: "sleep-aids".into(),
                description: None,
                image: None,
                sort_order: 2,
            })
            .await
            .unwrap();

        let ibuprofen = catalog
            .insert_product(NewProduct {
                category_id: pain.id.clone(),
                name: "Ibuprofen".into(),
                slug: "ibuprofen".into(),
                description: "Anti-inflammatory pain relief".into(),
                short_description: None,
                images: vec!["https://cdn.example.com/ibuprofen.jpg".into()],
                base_price_cents: 399,
                featured: true,
            })
            .await
            .unwrap();
        catalog
            .insert_variant(NewVariant {
                product_id: ibuprofen.id.clone(),
                name: "16 tablets".into(),
                strength: Some("200mg".into()),
                pack_size: 16,
                price_cents: 399,
                compare_at_price_cents: None,
                stock: 20,
                sku: None,
            })
            .await
            .unwrap();
        catalog
            .insert_variant(NewVariant {
                product_id: ibuprofen.id,
                name: "32 tablets".into(),
                strength: Some("200mg".into()),
                pack_size: 32,
                price_cents: 699,
                compare_at_price_cents: Some(799),
                stock: 10,
                sku: None,
            })
            .await
            .unwrap();

        catalog
            .insert_product(NewProduct {
                category_id: sleep.id,
                name: "Melatonin Complex".into(),
                slug: "melatonin-complex".into(),
                description: "Gentle sleep support".into(),
                short_description: None,
                images: vec![],
                base_price_cents: 1299,
                featured: false,
            })
            .await
            .unwrap();

        db
    }

    #[tokio::test]
    async fn test_list_products_includes_variants_and_category() {
        let db = seeded_db().await;
        let listings = db
            .catalog()
            .list_products(&ProductFilters::default())
            .await
            .unwrap();

        assert_eq!(listings.len(), 2);
        let ibuprofen = listings
            .iter()
            .find(|l| l.product.slug == "ibuprofen")
            .unwrap();
        assert_eq!(ibuprofen.variants.len(), 2);
        // cheapest first
        assert_eq!(ibuprofen.variants[0].price_cents, 399);
        assert_eq!(ibuprofen.category.slug, "pain-relief");
    }

    #[tokio::test]
    async fn test_filter_by_category_slug() {
        let db = seeded_db().await;
        let listings = db
            .catalog()
            .list_products(&ProductFilters {
                category_slug: Some("sleep-aids".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].product.slug, "melatonin-complex");
    }

    #[tokio::test]
    async fn test_filter_by_search() {
        let db = seeded_db().await;
        let listings = db
            .catalog()
            .list_products(&ProductFilters {
                search: Some("anti-inflammatory".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].product.slug, "ibuprofen");
    }

    #[tokio::test]
    async fn test_filter_featured_and_limit() {
        let db = seeded_db().await;
        let catalog = db.catalog();

        let featured = catalog
            .list_products(&ProductFilters {
                featured: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].product.slug, "ibuprofen");

        let limited = catalog
            .list_products(&ProductFilters {
                limit: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
    }
}
