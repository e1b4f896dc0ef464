#![allow(dead_code)]

pub mod bolt11;
pub mod keys;
