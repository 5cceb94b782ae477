//! Scene construction helpers

mod arena_builder;

pub use arena_builder::ArenaBuilder;
