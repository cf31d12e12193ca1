// File I/O operations

pub mod workdir;
pub mod xlsx;
pub mod xlsx_styles;

pub use workdir::WorkDir;
pub use xlsx::{export, merge, read_table, ExportResult, ReadError, WriteError};
pub use xlsx_styles::{FormatError, SheetStyle};
