// Database modules
pub mod connection;
pub mod migrations;

// Re-export database connection functions
pub use connection::{
    create_in_memory_pool, get_connection_info, get_db_pool, initialize_database_pool, parse_env_or,
    DatabaseConfig, DatabaseError, DatabasePool, DatabaseType,
};
