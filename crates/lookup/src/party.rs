use serde::Deserialize;

/// One candidate from the party suggestion endpoint.
///
/// Only the fields the bot reads are modelled; the rest of the payload is
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Suggestion {
    /// Display name, e.g. `ИП Иванов Иван Иванович` or `ООО "РОМАШКА"`
    pub value: String,
    #[serde(default)]
    pub data: Option<PartyData>,
}

impl Suggestion {
    /// Name of the organization's head, if the registry reported one.
    pub fn management_name(&self) -> Option<&str> {
        self.data
            .as_ref()?
            .management
            .as_ref()?
            .name
            .as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PartyData {
    #[serde(default)]
    pub management: Option<Management>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Management {
    #[serde(default)]
    pub name: Option<String>,
}

/// Response envelope: `{"suggestions": [...]}`.
#[derive(Debug, Deserialize)]
pub(crate) struct SuggestResponse {
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_legal_entity() {
        let json = r#"{
            "suggestions": [{
                "value": "ПАО СБЕРБАНК",
                "unrestricted_value": "ПАО СБЕРБАНК",
                "data": {
                    "inn": "7707083893",
                    "ogrn": "1027700132195",
                    "type": "LEGAL",
                    "management": {"name": "Греф Герман Оскарович", "post": "ПРЕЗИДЕНТ"},
                    "address": {"value": "г Москва"}
                }
            }]
        }"#;

        let resp: SuggestResponse = serde_json::from_str(json).unwrap();
        let s = &resp.suggestions[0];
        assert_eq!(s.value, "ПАО СБЕРБАНК");
        assert_eq!(s.management_name(), Some("Греф Герман Оскарович"));
    }

    #[test]
    fn test_parse_individual_without_management() {
        let json = r#"{"suggestions": [{"value": "ИП Иванов Иван Иванович", "data": {"type": "INDIVIDUAL", "management": null}}]}"#;
        let resp: SuggestResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.suggestions[0].management_name(), None);
    }

    #[test]
    fn test_parse_empty() {
        let resp: SuggestResponse = serde_json::from_str(r#"{"suggestions": []}"#).unwrap();
        assert!(resp.suggestions.is_empty());

        let resp: SuggestResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.suggestions.is_empty());
    }
}
