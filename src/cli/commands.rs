mod initdb;
mod serve;

pub use initdb::init_database;
pub use serve::serve;
