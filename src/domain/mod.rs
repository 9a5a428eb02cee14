pub mod cart;
pub mod feed;
