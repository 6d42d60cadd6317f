//! Person summaries for the monotributo report

use crate::types::RecordMap;
use serde::Serialize;
use indexmap::IndexMap;
use serde_json::Value;

const PHYSICAL_PERSON: &str = "FISICA";

/// Condensed view of one taxpayer's regime data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonSummary {
    pub es_monotributista: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_persona: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apellido: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub razon_social: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datos_monotributo: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datos_regimen_general: Option<Value>,
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(Value::Bool(true)) => true,
    }
}

/// Non-empty string form of a name field
fn text_field(general: &Value, key: &str) -> Option<String> {
    match general.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Null | Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

/// First character upper-cased, the rest lower-cased
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Summarize one record; `None` when it has neither regime block
pub fn summarize_person(record: &Value) -> Option<PersonSummary> {
    let monotributo = record.get("datosMonotributo");
    let regimen_general = record.get("datosRegimenGeneral");

    if !is_present(monotributo) && !is_present(regimen_general) {
        return None;
    }

    let mut summary = PersonSummary {
        es_monotributista: is_present(monotributo),
        tipo_persona: None,
        nombre: None,
        apellido: None,
        razon_social: None,
        datos_monotributo: monotributo.filter(|v| !v.is_null()).cloned(),
        datos_regimen_general: regimen_general.filter(|v| !v.is_null()).cloned(),
    };

    if let Some(general) = record.get("datosGenerales").filter(|g| is_present(Some(*g))) {
        let kind = general.get("tipoPersona").cloned().unwrap_or(Value::Null);
        if kind.as_str() == Some(PHYSICAL_PERSON) {
            summary.nombre = text_field(general, "nombre").map(|s| capitalize(s.trim()));
            summary.apellido = text_field(general, "apellido").map(|s| capitalize(s.trim()));
        } else {
            summary.razon_social = text_field(general, "razonSocial").map(|s| s.trim().to_uppercase());
        }
        summary.tipo_persona = Some(kind);
    }

    Some(summary)
}

/// Summaries for every record that has regime data, in record order
pub fn summarize_all(records: &RecordMap) -> IndexMap<String, PersonSummary> {
    records
        .iter()
        .filter_map(|(id, record)| summarize_person(record).map(|s| (id.clone(), s)))
        .collect()
}
