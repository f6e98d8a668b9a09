mod carts;
mod items;
mod products;

pub(crate) use carts::{CartRow, MySqlCartsRepository};
pub(crate) use items::MySqlItemsRepository;
pub(crate) use products::MySqlProductsRepository;
