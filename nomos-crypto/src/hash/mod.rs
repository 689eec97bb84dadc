#[allow(clippy::module_inception)]
mod hash;
mod hasher;

pub use self::{hash::Hash, hasher::Hasher};
