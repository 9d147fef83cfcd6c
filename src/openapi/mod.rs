//! API description rewriting.

mod mutator;

pub use mutator::ApiDescriptionMutator;
