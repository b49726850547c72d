#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod allocator;
mod error;
mod futures;
mod identifier;
mod key;
mod registrar;
#[cfg(feature = "serde")]
mod serde;
mod store;

pub use crate::allocator::*;
pub use crate::error::*;
pub use crate::futures::*;
pub use crate::identifier::*;
pub use crate::key::*;
pub use crate::registrar::*;
pub use crate::store::*;
