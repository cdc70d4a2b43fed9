//! Domain models for storefront.

pub mod product;
pub mod user;

pub use product::{Product, Specification};
pub use user::{NewUser, UserDocument, UserPatch};
