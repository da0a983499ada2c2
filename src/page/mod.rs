//! Page lifecycle shared by every unit page: flash banner, modal form,
//! record table, pagination and delete confirmation.
//!
//! Nothing here touches storage. Handlers build these values from request
//! data and hand their views to the templates.

pub mod context;
pub mod delete;
pub mod flash;
pub mod form;
pub mod modal;
pub mod pagination;
pub mod request;
pub mod table;

pub use context::{PageContext, UnitRef};
pub use flash::{FlashInfo, FlashKind};
pub use form::{Draft, EditingTarget, FieldErrors, FormController, Persisted};
pub use modal::Modal;
pub use pagination::Pagination;
pub use request::ResourceRoute;
pub use table::Table;
