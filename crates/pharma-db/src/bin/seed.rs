//! Development seed data.
//!
//! Populates an empty database with pharmacy categories, products and
//! variants so the storefront has something to render.
//!
//! ```bash
//! DATABASE_PATH=./data/pharma.db cargo run -p pharma-db --bin seed
//! ```
//!
//! Idempotent: refuses to run against a database that already has
//! categories.

use pharma_db::repository::catalog::{CatalogRepository, NewCategory, NewProduct, NewVariant};
use pharma_db::{Database, DbConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/pharma.db".to_string());
    if let Some(parent) = std::path::Path::new(&path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = Database::new(DbConfig::new(&path)).await?;
    let catalog = db.catalog();

    if catalog.category_count().await? > 0 {
        info!(path, "Database already seeded, nothing to do");
        return Ok(());
    }

    info!(path, "Seeding development data");
    seed_catalog(&catalog).await?;
    info!("Seed complete");

    db.close().await;
    Ok(())
}

async fn seed_catalog(catalog: &CatalogRepository) -> Result<(), Box<dyn std::error::Error>> {
    let pain = catalog
        .insert_category(NewCategory {
            name: "Pain Relief".into(),
            slug: "pain-relief".into(),
            description: Some("Everyday pain relief and anti-inflammatories".into()),
            image: Some("/images/categories/pain-relief.jpg".into()),
            sort_order: 1,
        })
        .await?;

    let sleep = catalog
        .insert_category(NewCategory {
            name: "Sleep Aids".into(),
            slug: "sleep-aids".into(),
            description: Some("Support for a better night's sleep".into()),
            image: Some("/images/categories/sleep-aids.jpg".into()),
            sort_order: 2,
        })
        .await?;

    let allergy = catalog
        .insert_category(NewCategory {
            name: "Allergy & Hayfever".into(),
            slug: "allergy-hayfever".into(),
            description: Some("Antihistamines and allergy relief".into()),
            image: Some("/images/categories/allergy.jpg".into()),
            sort_order: 3,
        })
        .await?;

    let vitamins = catalog
        .insert_category(NewCategory {
            name: "Vitamins & Supplements".into(),
            slug: "vitamins-supplements".into(),
            description: Some("Daily vitamins and wellbeing supplements".into()),
            image: Some("/images/categories/vitamins.jpg".into()),
            sort_order: 4,
        })
        .await?;

    // (category, name, slug, description, featured, base price, variants)
    type VariantSeed = (&'static str, Option<&'static str>, i64, i64, Option<i64>, i64);
    let products: Vec<(&str, &str, &str, &str, bool, i64, Vec<VariantSeed>)> = vec![
        (
            &pain.id,
            "Ibuprofen Tablets",
            "ibuprofen-tablets",
            "Fast-acting anti-inflammatory relief for headaches, muscular \
             pain and period pain.",
            true,
            399,
            vec![
                ("16 tablets", Some("200mg"), 16, 399, None, 120),
                ("32 tablets", Some("200mg"), 32, 699, Some(799), 80),
                ("16 tablets", Some("400mg"), 16, 549, None, 60),
            ],
        ),
        (
            &pain.id,
            "Paracetamol Caplets",
            "paracetamol-caplets",
            "Gentle, effective relief from pain and fever.",
            false,
            249,
            vec![
                ("16 caplets", Some("500mg"), 16, 249, None, 200),
                ("32 caplets", Some("500mg"), 32, 449, None, 150),
            ],
        ),
        (
            &sleep.id,
            "Nytol Herbal Tablets",
            "nytol-herbal-tablets",
            "Traditional herbal remedy used to aid restful sleep.",
            true,
            599,
            vec![
                ("30 tablets", None, 30, 599, None, 45),
                ("60 tablets", None, 60, 999, Some(1198), 30),
            ],
        ),
        (
            &allergy.id,
            "Cetirizine Hayfever Relief",
            "cetirizine-hayfever-relief",
            "One-a-day antihistamine for hayfever and skin allergies.",
            true,
            349,
            vec![
                ("14 tablets", Some("10mg"), 14, 349, None, 90),
                ("30 tablets", Some("10mg"), 30, 599, None, 70),
            ],
        ),
        (
            &allergy.id,
            "Loratadine Allergy Tablets",
            "loratadine-allergy-tablets",
            "Non-drowsy allergy relief lasting up to 24 hours.",
            false,
            329,
            vec![("30 tablets", Some("10mg"), 30, 329, None, 110)],
        ),
        (
            &vitamins.id,
            "Vitamin D3 Softgels",
            "vitamin-d3-softgels",
            "High-strength vitamin D for normal bones and immune function.",
            false,
            899,
            vec![
                ("90 softgels", Some("1000 IU"), 90, 899, None, 65),
                ("180 softgels", Some("1000 IU"), 180, 1499, Some(1798), 40),
            ],
        ),
    ];

    for (category_id, name, slug, description, featured, base_price, variants) in products {
        let product = catalog
            .insert_product(NewProduct {
                category_id: category_id.to_string(),
                name: name.into(),
                slug: slug.into(),
                description: description.into(),
                short_description: None,
                images: vec![format!("/images/products/{slug}.jpg")],
                base_price_cents: base_price,
                featured,
            })
            .await?;

        for (vname, strength, pack_size, price, compare_at, stock) in variants {
            catalog
                .insert_variant(NewVariant {
                    product_id: product.id.clone(),
                    name: vname.into(),
                    strength: strength.map(String::from),
                    pack_size,
                    price_cents: price,
                    compare_at_price_cents: compare_at,
                    stock,
                    sku: Some(format!(
                        "{}-{}",
                        slug.to_uppercase().replace('-', ""),
                        pack_size
                    )),
                })
                .await?;
        }

        info!(product = name, "Seeded product");
    }

    Ok(())
}
