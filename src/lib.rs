pub mod calendar;
pub mod error;
pub mod io;
pub mod model;
pub mod shapes;
pub mod sim;
pub mod vecutils;

// Prelude
pub use calendar::{LeapPolicy, ModelYear};
pub use error::{DemandError, Result};
pub use model::baseline::{BaselineProjection, BaselineUnit};
pub use model::conversion::ConversionTable;
pub use model::scenario::{ExtrapolationPolicy, InterpolationMode, Scenario};
pub use model::sector::{EnergyCarrier, Sector};
pub use model::zone::{ZoneId, ZoneSet};
pub use shapes::{ShapeLibrary, ShapeSpec, TemporalShape};
pub use sim::pipeline::{DemandModel, RunConfig, RunResult, YearResult};
pub use sim::spatial::{AllocationWeights, GridCellId};
