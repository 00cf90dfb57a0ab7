use serde::{Deserialize, Deserializer};

pub mod admin;
pub mod carts;
pub mod collections;
pub mod customers;
pub mod orders;
pub mod products;
pub mod promotions;
pub mod tags;

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`) so a
/// partial update can clear a nullable column.
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
