pub mod debounce;
pub mod evaluator;
pub mod gate;
pub mod metric;
pub mod vector;

pub use debounce::DebounceState;
pub use evaluator::{Match, MatchEvaluator, ReferencePose};
pub use gate::SpatialGate;
pub use metric::{chord_distance, cosine_similarity};
pub use vector::PoseVectorBuilder;
