pub mod address;
pub mod currency;
