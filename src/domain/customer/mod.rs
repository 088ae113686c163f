//! Customer Context - 客户限界上下文

mod address;
mod client;

pub use address::Address;
pub use client::{Client, ClientId};
