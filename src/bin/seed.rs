use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use storefront_admin_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{
        collections::CreateCollectionRequest,
        customers::{AddressRequest, CreateCustomerRequest},
        orders::{CreateOrderRequest, OrderItemInput},
        products::CreateProductRequest,
        promotions::CreatePromotionRequest,
        tags::{CreateTagRequest, TagObjectRequest},
    },
    entity::{Collections, EntityKind, collections},
    services::{
        collection_service, customer_service, order_service, product_service, promotion_service,
        tag_service,
    },
    state::AppState,
};

const DEMO_COLLECTION: &str = "Books";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;
    let state = AppState::new(orm);

    let existing = Collections::find()
        .filter(collections::Column::Title.eq(DEMO_COLLECTION))
        .one(&state.orm)
        .await?;
    if existing.is_some() {
        println!("Demo data already present, nothing to do");
        return Ok(());
    }

    seed(&state).await?;
    println!("Seed completed");
    Ok(())
}

async fn seed(state: &AppState) -> anyhow::Result<()> {
    let collection = collection_service::create_collection(
        state,
        CreateCollectionRequest {
            title: DEMO_COLLECTION.into(),
            featured_product_id: None,
        },
    )
    .await?
    .data
    .ok_or_else(|| anyhow::anyhow!("collection not returned"))?;

    let promotion = promotion_service::create_promotion(
        state,
        CreatePromotionRequest {
            description: "Summer sale".into(),
            discount: 0.15,
        },
    )
    .await?
    .data
    .ok_or_else(|| anyhow::anyhow!("promotion not returned"))?;

    let books = [
        ("The Rust Programming Language", "39.99", 25),
        ("Zero To Production", "45.00", 8),
        ("Programming Rust", "49.50", 0),
    ];
    let mut product_ids = Vec::new();
    for (title, price, inventory) in books {
        let product = product_service::create_product(
            state,
            CreateProductRequest {
                title: title.into(),
                slug: None,
                description: None,
                unit_price: price.parse::<Decimal>()?,
                inventory,
                collection_id: collection.id,
                promotion_ids: vec![promotion.id],
            },
        )
        .await?
        .data
        .ok_or_else(|| anyhow::anyhow!("product not returned"))?;
        println!("Seeded product {} ({})", product.title, product.slug);
        product_ids.push(product.id);
    }

    let customer = customer_service::create_customer(
        state,
        CreateCustomerRequest {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "555-0100".into(),
            birth_date: None,
            membership: None,
        },
    )
    .await?
    .data
    .ok_or_else(|| anyhow::anyhow!("customer not returned"))?;

    customer_service::set_address(
        state,
        customer.id,
        AddressRequest {
            street: "12 St James's Square".into(),
            city: "London".into(),
        },
    )
    .await?;

    order_service::create_order(
        state,
        CreateOrderRequest {
            customer_id: customer.id,
            payment_status: None,
            items: vec![OrderItemInput {
                product_id: product_ids[0],
                quantity: 2,
                unit_price: None,
            }],
        },
    )
    .await?;

    let tag = tag_service::create_tag(
        state,
        CreateTagRequest {
            label: "bestseller".into(),
        },
    )
    .await?
    .data
    .ok_or_else(|| anyhow::anyhow!("tag not returned"))?;
    tag_service::tag_object(
        state,
        TagObjectRequest {
            tag_id: tag.id,
            entity_kind: EntityKind::Product,
            object_id: product_ids[0],
        },
    )
    .await?;

    Ok(())
}
