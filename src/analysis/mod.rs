pub mod aggregator;
pub mod experience;
pub mod pipeline;
pub mod segmenter;
pub mod skill_filter;

pub use aggregator::Aggregator;
pub use experience::ExperienceDetector;
pub use pipeline::{ExtractionPipeline, RunReport};
pub use segmenter::{SegmentMode, Segmenter};
pub use skill_filter::SkillFilter;
