//! Copy/paste of object `events` between AR objects.

use serde_json::Value;
use tracing::info;

use crate::error::{LigError, Result};
use crate::properties::{LocalObjectProperties, StructuredText};
use crate::schema::to_pretty_json;

/// Session-scoped clipboard holding one copied `events` value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventClipboard {
    events: Option<Value>,
}

fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Number(_) => true,
    }
}

fn record_object(props: &LocalObjectProperties) -> Result<serde_json::Map<String, Value>> {
    if props.json_data.trim().is_empty() {
        return Err(LigError::schema(format!(
            "'{}' has no stored record",
            props.obj_name
        )));
    }
    match serde_json::from_str::<Value>(&props.json_data) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(LigError::decode("record must be a JSON object")),
        Err(e) => Err(LigError::decode(e.to_string())),
    }
}

impl EventClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_none()
    }

    pub fn events(&self) -> Option<&Value> {
        self.events.as_ref()
    }

    /// Copies the `events` of `source`. Fails when the record has none.
    pub fn copy_from(&mut self, source: &LocalObjectProperties) -> Result<()> {
        let data = record_object(source)?;
        match data.get("events").filter(|events| has_content(events)) {
            Some(events) => {
                self.events = Some(events.clone());
                info!(source = %source.obj_name, "Events copied");
                Ok(())
            }
            None => Err(LigError::schema("No events to copy")),
        }
    }

    /// Replaces the `events` of `target` with the copied value.
    pub fn paste_into(&self, target: &mut LocalObjectProperties) -> Result<()> {
        let events = self
            .events
            .as_ref()
            .ok_or_else(|| LigError::schema("No events to paste"))?;
        let mut data = record_object(target)?;
        data.insert("events".to_string(), events.clone());
        target.json_data = to_pretty_json(&data)?;
        target.events = StructuredText::from_json(Some(events));
        info!(target = %target.obj_name, "Events pasted");
        Ok(())
    }

    pub fn clear(&mut self) {
        self.events = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ar_object::ObjectTypeTag;
    use serde_json::json;

    fn props(value: Value) -> LocalObjectProperties {
        let mut props = LocalObjectProperties::with_json(value.to_string());
        props.sync_from_json().unwrap();
        props
    }

    #[test]
    fn test_copy_paste_clear() {
        let source = props(json!({"id": 1, "name": "a", "events": [{"type": "tap", "action": 3}]}));
        let mut target = props(json!({"id": 2, "name": "b", "events": [], "zone_id": 5}));
        let mut clipboard = EventClipboard::new();

        clipboard.copy_from(&source).unwrap();
        clipboard.paste_into(&mut target).unwrap();

        let written: Value = serde_json::from_str(&target.json_data).unwrap();
        assert_eq!(written["events"], json!([{"type": "tap", "action": 3}]));
        assert_eq!(written["zone_id"], json!(5));
        assert_eq!(
            target.events,
            StructuredText::Structured(json!([{"type": "tap", "action": 3}]))
        );

        clipboard.clear();
        assert!(clipboard.is_empty());
        assert!(clipboard.paste_into(&mut target).is_err());
    }

    #[test]
    fn test_pasted_events_survive_sync_to_json() {
        let source = props(json!({"id": 1, "name": "a", "model": {"type": 5}, "events": ["x"]}));
        let mut target = props(json!({"id": 2, "name": "b", "model": {"type": 5}, "events": ["old"]}));
        let mut clipboard = EventClipboard::new();
        clipboard.copy_from(&source).unwrap();
        clipboard.paste_into(&mut target).unwrap();

        target.sync_to_json(ObjectTypeTag::Image).unwrap();
        let written: Value = serde_json::from_str(&target.json_data).unwrap();
        assert_eq!(written["events"], json!(["x"]));
    }

    #[test]
    fn test_copy_without_events_fails() {
        let mut clipboard = EventClipboard::new();
        let empty = props(json!({"id": 1, "name": "a", "events": []}));
        let err = clipboard.copy_from(&empty).unwrap_err();
        assert_eq!(err.to_string(), "Schema error: No events to copy");
        assert!(clipboard.is_empty());
    }

    #[test]
    fn test_copy_from_object_without_record_fails() {
        let mut clipboard = EventClipboard::new();
        assert!(clipboard.copy_from(&LocalObjectProperties::default()).is_err());
    }
}
