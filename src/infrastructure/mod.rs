pub mod identity;
pub mod memory;
pub mod models;
pub mod order_repo;

#[cfg(test)]
mod test_db;
