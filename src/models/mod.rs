pub mod bid;
pub mod driver;
pub mod order;
pub mod route;
