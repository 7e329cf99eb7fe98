mod dependent;
mod section;
mod visibility;

pub use dependent::{DependencyEdge, DependentSelection, FilterByParent, ParamBuilder};
pub use section::{CollapsibleSection, MARKER_OPEN, SectionController};
pub use visibility::{Predicate, VisibilityController, VisibilityRule, VisibilityTarget};
