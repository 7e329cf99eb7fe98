mod actions;
mod error;
mod events;
mod field;
mod mask;
mod registry;

pub use actions::FormCommand;
pub use error::FormError;
pub use events::{EventBus, Listener, Subscription};
pub use field::{FieldHandle, FieldId, FieldState, FieldValue, LookupStatus};
pub use mask::{CPF_PATTERN, Mask, PHONE_PATTERN};
pub use registry::{FieldBlock, FieldRegistry};
