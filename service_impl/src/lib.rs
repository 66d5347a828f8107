pub mod availability;
pub mod booking;
pub mod capacity;
pub mod clock;
pub mod config;
pub mod deposit;
pub mod discount;
pub mod line_item;
pub mod macros;
pub mod pricing;
pub mod resource_lock;
pub mod uuid_service;

#[cfg(test)]
mod test;
