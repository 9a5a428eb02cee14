pub mod error;
pub mod model;
pub mod store;

pub use error::CartError;
pub use model::{CartLine, CartSnapshot, CartTotals};
pub use store::{CartObserver, CartStore};
