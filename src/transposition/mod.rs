pub mod optimizer;

pub use optimizer::{apply_transpose, find_transpose, unplayable_notes, TransposeMode, TransposeReport};
