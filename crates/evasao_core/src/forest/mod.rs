//! Random forest classifier evaluation
//!
//! Trees are plain threshold splits over the aligned `f64` feature vector.
//! The forest is persisted as canonical JSON:
//!
//! ```json
//! {
//!   "feature_names": ["Carga Horaria", "..."],
//!   "metadata": {"created_at": 0, "metrics": {}, "seed": 42, "training_data_hash": "", "training_samples": 0},
//!   "n_features": 2,
//!   "trees": [
//!     {"nodes": [
//!       {"feature_idx": 0, "id": 0, "leaf": null, "left": 1, "right": 2, "threshold": 0.5},
//!       {"feature_idx": -1, "id": 1, "leaf": 0.1, "left": -1, "right": -1, "threshold": 0.0},
//!       {"feature_idx": -1, "id": 2, "leaf": 0.8, "left": -1, "right": -1, "threshold": 0.0}
//!     ]}
//!   ],
//!   "version": 1
//! }
//! ```

pub mod model;
pub mod tree;

pub use model::{ForestMetadata, RandomForest, FOREST_FORMAT_VERSION};
pub use tree::{Node, Tree};
