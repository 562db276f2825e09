pub mod extractor;
pub mod frame;
