pub mod candidate;
pub mod error;
pub mod hierarchy;
pub mod ids;
pub mod level;
pub mod mapping;
pub mod meta;

pub use candidate::{FilterCandidate, LocationAttributes, LocationCandidate, OptionCandidate};
pub use error::{ModelError, Result};
pub use hierarchy::{FilterHierarchy, FilterHierarchyTier};
pub use ids::DataSetVersionId;
pub use level::GeographicLevel;
pub use mapping::{
    DataSetVersionMapping, FilterMapping, FilterMappingPlan, FilterOptionMapping,
    IndicatorMapping, IndicatorMappingPlan, LabelSource, LocationLevelMappings,
    LocationMappingPlan, LocationOptionMapping, LocationSource, MappingEntry, MappingKind,
    MappingType, PublicIdAssignments, RawMappingKind,
};
pub use meta::{DataSetMeta, FilterMeta, FilterOptionMeta, IndicatorMeta, LocationOptionMeta};
