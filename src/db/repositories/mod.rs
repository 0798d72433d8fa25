pub mod customers;
pub mod estimates;
pub mod items;
pub mod seed;
