mod codec;
mod error;
mod record;
mod sequence;
#[cfg(test)]
mod tests;

pub use codec::*;
pub use error::*;
pub use record::*;
pub use sequence::*;
