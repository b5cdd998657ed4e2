pub mod dispatch;
pub mod migrate;
pub mod schema;
