pub mod dense;

pub use dense::{ForwardCache, Gradients, Layer};
