pub mod geometry;
pub mod mathml;
pub mod normalize;
pub mod ports;
pub mod selection;

pub use mathml::extract_pure_mathml;
pub use normalize::{normalize, normalize_opt};
