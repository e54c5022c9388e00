pub mod cache;
pub mod openf1;
