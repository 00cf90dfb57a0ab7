pub mod addresses;
pub mod admin_log_entries;
pub mod cart_items;
pub mod carts;
pub mod collections;
pub mod customers;
pub mod kind;
pub mod order_items;
pub mod orders;
pub mod product_promotions;
pub mod products;
pub mod promotions;
pub mod tagged_items;
pub mod tags;

pub use addresses::Entity as Addresses;
pub use admin_log_entries::Entity as AdminLogEntries;
pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use collections::Entity as Collections;
pub use customers::Entity as Customers;
pub use kind::EntityKind;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use product_promotions::Entity as ProductPromotions;
pub use products::Entity as Products;
pub use promotions::Entity as Promotions;
pub use tagged_items::Entity as TaggedItems;
pub use tags::Entity as Tags;
