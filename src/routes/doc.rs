use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    admin::{AdminAction, DateRange, InlineConfig, ListColumn, ListFilter},
    dto::{admin as admin_dto, carts, collections, customers, orders, products, promotions, tags},
    entity::{
        EntityKind, admin_log_entries::ActionFlag, customers::Membership,
        orders::PaymentStatus, products::InventoryStatus,
    },
    models::{
        Address, AdminLogEntry, Cart, CartItem, Collection, Customer, Order, OrderItem, Product,
        Promotion, Tag, TaggedItem,
    },
    response::{ApiResponse, Meta},
    routes::{
        admin, carts as cart_routes, collections as collection_routes,
        customers as customer_routes, health, orders as order_routes, params,
        products as product_routes, promotions as promotion_routes, tags as tag_routes,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        collection_routes::list_collections,
        collection_routes::create_collection,
        collection_routes::get_collection,
        collection_routes::update_collection,
        collection_routes::delete_collection,
        product_routes::list_products,
        product_routes::create_product,
        product_routes::get_product,
        product_routes::update_product,
        product_routes::delete_product,
        product_routes::set_promotions,
        product_routes::clear_inventory,
        promotion_routes::list_promotions,
        promotion_routes::create_promotion,
        promotion_routes::get_promotion,
        promotion_routes::update_promotion,
        promotion_routes::delete_promotion,
        customer_routes::list_customers,
        customer_routes::create_customer,
        customer_routes::get_customer,
        customer_routes::update_customer,
        customer_routes::delete_customer,
        customer_routes::get_address,
        customer_routes::set_address,
        customer_routes::delete_address,
        order_routes::list_orders,
        order_routes::create_order,
        order_routes::get_order,
        order_routes::update_order,
        order_routes::delete_order,
        order_routes::add_order_item,
        order_routes::update_order_item,
        order_routes::delete_order_item,
        cart_routes::create_cart,
        cart_routes::get_cart,
        cart_routes::delete_cart,
        cart_routes::add_cart_item,
        cart_routes::update_cart_item,
        cart_routes::remove_cart_item,
        tag_routes::list_tags,
        tag_routes::create_tag,
        tag_routes::delete_tag,
        tag_routes::list_tagged_items,
        tag_routes::tag_object,
        tag_routes::untag,
        admin::site_index,
        admin::recent_actions,
        admin::changelist,
        admin::change_view,
        admin::update_field,
        admin::run_action,
        admin::autocomplete,
        admin::create_order_with_items
    ),
    components(
        schemas(
            EntityKind,
            Membership,
            PaymentStatus,
            InventoryStatus,
            ActionFlag,
            Collection,
            Product,
            Promotion,
            Customer,
            Address,
            Order,
            OrderItem,
            Cart,
            CartItem,
            Tag,
            TaggedItem,
            AdminLogEntry,
            AdminAction,
            DateRange,
            InlineConfig,
            ListColumn,
            ListFilter,
            collections::CreateCollectionRequest,
            collections::UpdateCollectionRequest,
            collections::CollectionList,
            products::CreateProductRequest,
            products::UpdateProductRequest,
            products::SetPromotionsRequest,
            products::ClearInventoryRequest,
            products::ClearInventoryResult,
            products::ProductList,
            products::ProductDetail,
            promotions::CreatePromotionRequest,
            promotions::UpdatePromotionRequest,
            promotions::PromotionList,
            customers::CreateCustomerRequest,
            customers::UpdateCustomerRequest,
            customers::AddressRequest,
            customers::CustomerList,
            orders::CreateOrderRequest,
            orders::OrderItemInput,
            orders::UpdateOrderRequest,
            orders::UpdateOrderItemRequest,
            orders::OrderWithItems,
            orders::OrderList,
            carts::AddCartItemRequest,
            carts::UpdateCartItemRequest,
            carts::CartWithItems,
            tags::CreateTagRequest,
            tags::TagObjectRequest,
            tags::TagList,
            tags::TaggedItemList,
            admin_dto::SiteIndex,
            admin_dto::Changelist,
            admin_dto::ChangeView,
            admin_dto::FieldUpdateRequest,
            admin_dto::ActionRequest,
            admin_dto::ActionResult,
            admin_dto::AutocompleteResults,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<products::ProductList>,
            ApiResponse<orders::OrderWithItems>,
            ApiResponse<orders::OrderList>,
            ApiResponse<admin_dto::Changelist>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Collections", description = "Collection endpoints"),
        (name = "Products", description = "Product endpoints"),
        (name = "Promotions", description = "Promotion endpoints"),
        (name = "Customers", description = "Customer and address endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Carts", description = "Cart endpoints"),
        (name = "Tags", description = "Tag and tagged item endpoints"),
        (name = "Admin", description = "Generic admin views"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
