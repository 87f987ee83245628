pub mod annotator;
pub mod color;
pub mod extractor;
pub mod region;
pub mod rule_engine;
pub mod segmenter;
