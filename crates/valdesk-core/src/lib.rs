pub mod binder;
pub mod editor;
pub mod error;
pub mod query;
pub mod source;
pub mod surface;

pub use binder::ChoiceBinder;
pub use editor::{FieldInput, RecordEditor};
pub use error::{EditError, ExportError};
pub use query::{ExportOutcome, ExportSink, QueryRunner, default_export_name};
pub use source::{DataSource, SourceError};
pub use surface::{AutoConfirm, ConfirmPrompt, LogMessenger, Messenger};
