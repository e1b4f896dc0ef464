pub mod bolt11;
pub mod invoice;
