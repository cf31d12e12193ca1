use innbot_core::{Table, FULL_NAME_COLUMN, INN_COLUMN};

/// Output column order: ИНН, ФИО, then everything else as it came in.
pub fn present(table: &Table) -> Table {
    table.with_leading(&[INN_COLUMN, FULL_NAME_COLUMN])
}
