// End-to-end pipeline tests: xlsx in, xlsx out, fake registry.
// Run with: cargo test -p innbot-engine --test pipeline

use std::cell::Cell;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use innbot_engine::{EnrichError, Pipeline, PipelineError};
use innbot_io::SheetStyle;
use innbot_lookup::{LookupError, Management, PartyData, PartySuggester, Suggestion};

/// Answers every 12-digit query with an entrepreneur and every 10-digit query
/// with an organization whose head is known only for `1111111111`.
struct Registry {
    calls: Cell<usize>,
}

impl Registry {
    fn new() -> Self {
        Self { calls: Cell::new(0) }
    }
}

impl PartySuggester for Registry {
    fn suggest_party(&self, query: &str) -> Result<Option<Suggestion>, LookupError> {
        self.calls.set(self.calls.get() + 1);
        let inn = query.split(' ').next().unwrap_or("");
        let suggestion = match inn.len() {
            12 => Suggestion {
                value: format!("ИП Предприниматель {}", &inn[..2]),
                ..Default::default()
            },
            10 => Suggestion {
                value: "ООО \"РОМАШКА\"".into(),
                data: Some(PartyData {
                    management: (inn == "1111111111").then(|| Management {
                        name: Some("Петров П.П.".into()),
                    }),
                    ..Default::default()
                }),
            },
            _ => return Ok(None),
        };
        Ok(Some(suggestion))
    }
}

fn write_xlsx(path: &Path, header: &[&str], rows: &[&[&str]]) {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (c, name) in header.iter().enumerate() {
        sheet.write_string(0, c as u16, *name).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            sheet.write_string(r as u32 + 1, c as u16, *value).unwrap();
        }
    }
    workbook.save(path).unwrap();
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    let range = workbook.worksheet_range("Sheet1").unwrap();
    range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::String(s) => s.clone(),
                    Data::Empty => String::new(),
                    other => format!("{:?}", other),
                })
                .collect()
        })
        .collect()
}

#[test]
fn two_files_merge_enrich_and_reorder() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.xlsx");
    let b = dir.path().join("b.xlsx");
    let out = dir.path().join("out.xlsx");
    write_xlsx(&a, &["ИНН", "ОГРН"], &[&["123456789012", "0"]]);
    write_xlsx(&b, &["Город"], &[&["Москва"]]);

    let registry = Registry::new();
    let pipeline = Pipeline::new(&registry, SheetStyle::default());
    let (stats, export) = pipeline.run(&a, Some(&b), &out).unwrap();

    assert_eq!(stats.rows, 1);
    assert_eq!(registry.calls.get(), 1);
    assert!(export.styled);
    assert_eq!(
        read_rows(&out),
        vec![
            vec!["ИНН", "ФИО", "ОГРН", "Город"],
            vec!["123456789012", "Предприниматель 12", "0", "Москва"],
        ]
    );
}

#[test]
fn thirteen_digit_identifier_is_not_looked_up() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.xlsx");
    let b = dir.path().join("b.xlsx");
    let out = dir.path().join("out.xlsx");
    write_xlsx(&a, &["ИНН", "ОГРН"], &[&["1234567890123", "0"]]);
    write_xlsx(&b, &["Город"], &[&["Москва"]]);

    let registry = Registry::new();
    Pipeline::new(&registry, SheetStyle::default())
        .run(&a, Some(&b), &out)
        .unwrap();

    assert_eq!(registry.calls.get(), 0);
    assert_eq!(
        read_rows(&out),
        vec![
            vec!["ИНН", "ФИО", "ОГРН", "Город"],
            vec!["1234567890123", "", "0", "Москва"],
        ]
    );
}

#[test]
fn single_file_with_mixed_identifiers() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.xlsx");
    let out = dir.path().join("out.xlsx");
    write_xlsx(
        &a,
        &["Компания", "ИНН"],
        &[
            &["Ромашка", "1111111111"],
            &["Иванов", "987654321098"],
            &["Неизвестно", "42"],
        ],
    );

    let registry = Registry::new();
    Pipeline::new(&registry, SheetStyle::default())
        .run(&a, None, &out)
        .unwrap();

    assert_eq!(registry.calls.get(), 2);
    assert_eq!(
        read_rows(&out),
        vec![
            vec!["ИНН", "ФИО", "Компания"],
            vec!["1111111111", "Петров П.П.", "Ромашка"],
            vec!["987654321098", "Предприниматель 98", "Иванов"],
            vec!["42", "", "Неизвестно"],
        ]
    );
}

#[test]
fn organization_without_head_produces_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.xlsx");
    let out = dir.path().join("out.xlsx");
    write_xlsx(&a, &["ИНН"], &[&["2222222222"]]);

    let registry = Registry::new();
    let err = Pipeline::new(&registry, SheetStyle::default())
        .run(&a, None, &out)
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Enrich(EnrichError::LookupShape { .. })
    ));
    assert!(!out.exists());
}

#[test]
fn mismatched_row_counts_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.xlsx");
    let b = dir.path().join("b.xlsx");
    write_xlsx(&a, &["ИНН"], &[&["1"], &["2"]]);
    write_xlsx(&b, &["Город"], &[&["Москва"]]);

    let registry = Registry::new();
    let err = Pipeline::new(&registry, SheetStyle::default())
        .merge(&a, Some(&b))
        .unwrap_err();

    assert!(matches!(err, PipelineError::Read(_)));
    assert!(err.to_string().contains("row count mismatch"));
}
