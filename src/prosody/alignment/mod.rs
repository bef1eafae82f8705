pub mod dtw;

pub use dtw::{dtw_similarity, min_max_normalize, resample_linear};
