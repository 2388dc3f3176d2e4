pub mod aspect;
mod gradient;

pub use aspect::compute_aspect;
