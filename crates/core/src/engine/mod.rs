pub mod domain;
pub mod engine_context;
pub mod infrastructure;
pub mod load_strategy;

#[cfg(test)]
pub(crate) mod fake_backend;
