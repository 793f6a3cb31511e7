mod view_store;
mod viewed_handler;

pub use view_store::{PgViewStore, ViewStore};
pub use viewed_handler::ViewedEventHandler;
