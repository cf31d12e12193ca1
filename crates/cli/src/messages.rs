//! Chat replies. Users of the bot read Russian, so every text is Russian.

pub const WELCOME: &str = "Добро пожаловать!";

pub const DOCUMENT_INFO_MISSING: &str = "Не удалось получить информацию о документе.";

pub const REJECT_BATCH: &str =
    "Пожалуйста, отправьте один или два файла Excel (.xlsx) одним сообщением (как группу).";

/// Rows looked up per second, as observed against the production service.
const LOOKUPS_PER_SECOND: f64 = 1.6;

pub fn estimate(rows: usize) -> String {
    format!(
        "Поиск ФИО, пожалуйста, подождите... Ожидаемое время: {:.1} секунд",
        rows as f64 / LOOKUPS_PER_SECOND
    )
}

pub fn success(file_names: &[String]) -> String {
    match file_names {
        [one] => format!("Файл '{}' успешно скачан и обработан.", one),
        [first, second] => format!("Файлы '{}' и '{}' успешно скачаны и обработаны.", first, second),
        many => {
            let quoted: Vec<String> = many.iter().map(|n| format!("'{}'", n)).collect();
            format!("Файлы {} успешно скачаны и обработаны.", quoted.join(", "))
        }
    }
}

pub fn failure(error: &dyn std::fmt::Display) -> String {
    format!("Произошла ошибка при скачивании или обработке файлов: {}", error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate() {
        assert_eq!(
            estimate(16),
            "Поиск ФИО, пожалуйста, подождите... Ожидаемое время: 10.0 секунд"
        );
        assert!(estimate(1).ends_with("0.6 секунд"));
    }

    #[test]
    fn test_success_names_files() {
        assert_eq!(
            success(&["a.xlsx".into()]),
            "Файл 'a.xlsx' успешно скачан и обработан."
        );
        assert_eq!(
            success(&["a.xlsx".into(), "b.xlsx".into()]),
            "Файлы 'a.xlsx' и 'b.xlsx' успешно скачаны и обработаны."
        );
    }

    #[test]
    fn test_failure_includes_cause() {
        let msg = failure(&"row count mismatch");
        assert!(msg.starts_with("Произошла ошибка"));
        assert!(msg.ends_with("row count mismatch"));
    }
}
