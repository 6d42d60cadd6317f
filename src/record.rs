//! Record normalization and error classification
//!
//! Registry records are arbitrary nested JSON. Everything here is a pure
//! traversal over [`serde_json::Value`]; none of it knows about HTTP.

use crate::logging::Logger;
use crate::types::{ErrorEntry, ErrorMap, RecordMap};
use serde_json::Value;

/// Fields of an `inscription` record that signal a per-taxpayer error
pub const INSCRIPTION_ERROR_KEYS: [&str; 3] =
    ["errorMonotributo", "errorConstancia", "errorRegimenGeneral"];

const ERROR_FIELD: &str = "error";

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Drop every object entry whose value is `null` or `[]`, recursively.
///
/// Only the immediate value is tested: an object that ends up empty after its
/// own children are cleaned is kept. Scalars pass through untouched.
pub fn clean_record(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, v)| !is_blank(v))
                .map(|(k, v)| (k.clone(), clean_record(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(clean_record).collect()),
        other => other.clone(),
    }
}

/// Fold a list of single-key `{id: record}` objects into one map.
///
/// A repeated identifier overwrites the earlier entry.
pub fn merge_records(records: Vec<Value>, logger: &Logger) -> RecordMap {
    let mut merged = RecordMap::new();
    for item in records {
        match item {
            Value::Object(entries) => {
                for (id, record) in entries {
                    if merged.contains_key(&id) {
                        logger.warning(&format!("Duplicate record for '{}', keeping the latest", id));
                    }
                    merged.insert(id, record);
                }
            }
            other => logger.warning(&format!("Skipping non-object response element: {}", other)),
        }
    }
    merged
}

/// Collect the domain errors carried by `record` under `error_keys`.
///
/// For each key in order: an object with an `error` entry contributes that
/// entry (spliced when it is a list), an object without one contributes
/// nothing, and any other value is taken as the error itself.
pub fn extract_errors<S: AsRef<str>>(record: &Value, error_keys: &[S]) -> Vec<Value> {
    let Some(fields) = record.as_object() else {
        return Vec::new();
    };

    let mut errors = Vec::new();
    for key in error_keys {
        match fields.get(key.as_ref()) {
            Some(Value::Object(info)) => match info.get(ERROR_FIELD) {
                Some(Value::Array(list)) => errors.extend(list.iter().cloned()),
                Some(single) => errors.push(single.clone()),
                None => {}
            },
            Some(other) => errors.push(other.clone()),
            None => {}
        }
    }
    errors
}

/// Map every identifier with at least one extracted error to its errors
pub fn accumulate_errors<S: AsRef<str>>(records: &RecordMap, error_keys: &[S]) -> ErrorMap {
    records
        .iter()
        .filter_map(|(id, record)| {
            let mut errors = extract_errors(record, error_keys);
            let entry = match errors.len() {
                0 => return None,
                1 => ErrorEntry::Single(errors.remove(0)),
                _ => ErrorEntry::Many(errors),
            };
            Some((id.clone(), entry))
        })
        .collect()
}

/// Records whose identifier does not appear in `errors`
pub fn without_keys(records: &RecordMap, errors: &ErrorMap) -> RecordMap {
    records
        .iter()
        .filter(|(id, _)| !errors.contains_key(id.as_str()))
        .map(|(id, record)| (id.clone(), record.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn samples() -> Vec<Value> {
        vec![
            json!({"a": null, "b": [], "c": 0, "d": "", "e": false}),
            json!({"outer": {"inner": null, "list": [], "keep": [1, null, []]}}),
            json!([{"x": null}, [], {"y": {"z": []}}]),
            json!({"nested": {"only_blank": null}}),
            json!(7),
            json!("text"),
        ]
    }

    #[test]
    fn clean_removes_null_and_empty_lists_only() {
        let cleaned = clean_record(&json!({
            "a": null, "b": [], "c": 0, "d": "", "e": false, "f": {}
        }));
        assert_eq!(cleaned, json!({"c": 0, "d": "", "e": false, "f": {}}));
    }

    #[test]
    fn clean_recurses_into_objects_and_arrays() {
        let cleaned = clean_record(&json!({
            "outer": {"inner": null, "list": [], "keep": [1, null, [], {"k": null}]}
        }));
        assert_eq!(
            cleaned,
            json!({"outer": {"keep": [1, null, [], {}]}})
        );
    }

    #[test]
    fn clean_keeps_parents_emptied_by_cleaning() {
        let cleaned = clean_record(&json!({"nested": {"only_blank": null}, "wrap": [[]]}));
        assert_eq!(cleaned, json!({"nested": {}, "wrap": [[]]}));
    }

    #[test]
    fn clean_is_idempotent() {
        for sample in samples() {
            let once = clean_record(&sample);
            assert_eq!(clean_record(&once), once, "not idempotent for {}", sample);
        }
    }

    #[test]
    fn clean_never_drops_non_blank_values() {
        let record = json!({"n": 1, "s": "x", "arr": [0], "obj": {"k": 1}});
        assert_eq!(clean_record(&record), record);
    }

    #[test]
    fn merge_is_last_write_wins() {
        let logger = Logger::new_quiet();
        let merged = merge_records(
            vec![
                json!({"1": {"v": "first"}}),
                json!({"2": {"v": "two"}}),
                json!("garbage"),
                json!({"1": {"v": "second"}}),
            ],
            &logger,
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged["1"], json!({"v": "second"}));
        let keys: Vec<&String> = merged.keys().collect();
        assert_eq!(keys, ["1", "2"]);
    }

    #[test]
    fn extract_follows_key_order_and_splices_lists() {
        let record = json!({
            "errorB": {"error": ["b1", "b2"]},
            "errorA": {"error": "a1"},
            "errorC": "plain",
            "errorD": {"detail": "no error field"}
        });
        let errors = extract_errors(&record, &["errorA", "errorB", "errorC", "errorD", "missing"]);
        assert_eq!(errors, vec![json!("a1"), json!("b1"), json!("b2"), json!("plain")]);
    }

    #[test]
    fn extract_on_non_object_record_is_empty() {
        assert!(extract_errors(&json!([1, 2]), &["errorX"]).is_empty());
    }

    #[test]
    fn accumulate_stores_single_bare_and_many_as_list() {
        let records: RecordMap = serde_json::from_value(json!({
            "A": {"errorX": {"error": "bad id"}},
            "B": {"errorX": {"error": ["e1", "e2"]}},
            "C": {"ok": true}
        }))
        .unwrap();

        let errors = accumulate_errors(&records, &["errorX"]);
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({"A": "bad id", "B": ["e1", "e2"]})
        );
        assert!(errors.keys().all(|k| records.contains_key(k)));
    }

    #[test]
    fn accumulate_with_inscription_keys() {
        let records: RecordMap = serde_json::from_value(json!({
            "20111111112": {
                "errorConstancia": {"error": ["La clave no registra"]},
                "errorMonotributo": {"error": "No inscripto"}
            },
            "20222222223": {"datosGenerales": {"tipoPersona": "FISICA"}}
        }))
        .unwrap();

        let errors = accumulate_errors(&records, &INSCRIPTION_ERROR_KEYS);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors["20111111112"],
            ErrorEntry::Many(vec![json!("No inscripto"), json!("La clave no registra")])
        );

        let ok = without_keys(&records, &errors);
        assert_eq!(ok.keys().collect::<Vec<_>>(), ["20222222223"]);
    }

    #[test]
    fn accumulate_keeps_record_order() {
        let records: RecordMap = serde_json::from_value(json!({
            "9": {"errorX": "late"},
            "1": {"errorX": "early"},
            "5": {"errorX": {"error": "middle"}}
        }))
        .unwrap();

        let errors = accumulate_errors(&records, &["errorX"]);
        assert_eq!(errors.keys().collect::<Vec<_>>(), ["9", "1", "5"]);
        assert_eq!(
            serde_json::to_string(&errors).unwrap(),
            r#"{"9":"late","1":"early","5":"middle"}"#
        );
    }
}
