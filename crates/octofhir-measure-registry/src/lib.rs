//! Measure specifications and code set registry
//!
//! Every quality measure is described declaratively by a [`MeasureSpec`]:
//! eligibility criteria, ordered exclusion rules, numerator modalities with
//! their own lookback windows, a combination rule and a gap policy. Specs
//! are served by a versioned [`CodeSetRegistry`] loaded once at startup, so
//! annual code-set updates only touch data.

pub mod codes;
pub mod medication;
pub mod priority;
pub mod registry;
pub mod spec;

pub use codes::CodeSet;
pub use medication::MedicationClass;
pub use priority::{ComorbidityBonus, GapActions, GapPolicy, PriorityLevel, PriorityTable};
pub use registry::{Catalogue, CodeSetRegistry};
pub use spec::*;
