pub mod board;
pub mod connection;
pub mod constants;
pub mod energy;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod location;
pub mod pathfinder;
pub mod profile;
pub mod random;
pub mod rotation;
pub mod snapshot;
pub mod state;
pub mod targeting;
pub mod threat;
pub mod zone;

pub use engine::DecisionEngine;
pub use error::ProfileError;
pub use location::Location;
pub use profile::{EngineProfile, PathHeuristic};
pub use random::{FirstChoice, RandomSource, SeededRandom};
pub use snapshot::{Action, Lighthouse, PlayerId, RawLighthouse, RawPosition, RawTurn, TurnSnapshot};
pub use state::{EngineState, GamePhase};
