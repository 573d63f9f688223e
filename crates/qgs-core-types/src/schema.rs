//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names consistent between the logging macros,
//! the operator boundary, and test assertions.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Scene entity identifiers
pub const FIELD_OBJECT: &str = "object";
pub const FIELD_ARMATURE: &str = "armature";
pub const FIELD_BONE: &str = "bone";
pub const FIELD_VERTEX_GROUP: &str = "vertex_group";
pub const FIELD_BACKUP_ID: &str = "backup_id";

// Report fields
pub const FIELD_STATUS: &str = "status";
pub const FIELD_SEVERITY: &str = "severity";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_entity_fields_are_distinct() {
        let fields = [
            FIELD_OBJECT,
            FIELD_ARMATURE,
            FIELD_BONE,
            FIELD_VERTEX_GROUP,
            FIELD_BACKUP_ID,
        ];
        for (i, a) in fields.iter().enumerate() {
            for b in &fields[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
