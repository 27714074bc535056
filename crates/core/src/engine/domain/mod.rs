pub mod accelerator;
pub mod inference_backend;
