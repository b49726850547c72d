//! `serde` support for the identifier value types.
//!
//! [`Identifier`] and [`LocationCode`] serialize as their canonical strings,
//! [`Year`] and [`Sequence`] as integers. Every deserializer validates with the
//! same rules as the type's own constructor, so a malformed payload is
//! rejected rather than smuggled in.
//!
//! [`Identifier`]: crate::Identifier
//! [`LocationCode`]: crate::LocationCode
//! [`Year`]: crate::Year
//! [`Sequence`]: crate::Sequence

mod identifier;
mod key;
