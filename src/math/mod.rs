pub mod matrix;
pub mod text;

pub use matrix::Matrix;
pub use text::LineReader;
