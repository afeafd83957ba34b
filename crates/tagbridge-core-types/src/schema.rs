//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Tree and owner identifiers
pub const FIELD_KEY_PATH: &str = "key_path";
pub const FIELD_OWNER_KIND: &str = "owner_kind";
pub const FIELD_FILE_PATH: &str = "file_path";

// Host resolution
pub const FIELD_HOST_VERSION: &str = "host_version";
pub const FIELD_ACCESSOR: &str = "accessor";
pub const FIELD_INTERNAL_NAME: &str = "internal_name";
pub const FIELD_LOADED: &str = "loaded";
pub const FIELD_UNLOADED: &str = "unloaded";
pub const FIELD_INCOMPATIBLE: &str = "incompatible";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_accessibility() {
        assert!(!FIELD_COMPONENT.is_empty());
        assert!(!FIELD_OP.is_empty());
        assert!(!FIELD_KEY_PATH.is_empty());
        assert!(!EVENT_START.is_empty());
        assert!(!EVENT_END.is_empty());
        assert!(!EVENT_END_ERROR.is_empty());
    }

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_resolution_summary_fields_are_distinct() {
        assert_ne!(FIELD_LOADED, FIELD_UNLOADED);
        assert_ne!(FIELD_UNLOADED, FIELD_INCOMPATIBLE);
    }
}
