//! # Update notification payload.
//!
//! The controller publishes on the update topic:
//! ```text
//! { "versions": { "subcoVersion": "5.0.0" }, "imageVersions": ["fleet-subco:v2", ...] }
//! ```
//! Both fields are optional and independent. Unknown fields are ignored.
//!
//! Decoding happens in two stages so the two failure modes stay distinct:
//! bytes → `serde_json::Value` ([`UpdateError::Malformed`]) and
//! `Value` → [`UpdateNotification`] ([`UpdateError::WrongShape`]).

use serde::Deserialize;

use crate::error::UpdateError;

/// Parsed update notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNotification {
    /// Per-service version overrides.
    #[serde(default)]
    pub versions: Option<VersionOverrides>,
    /// Full image set of the fleet, when announced.
    #[serde(default)]
    pub image_versions: Option<Vec<String>>,
}

/// The `versions` object of a notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionOverrides {
    /// Explicit version for this service.
    #[serde(default)]
    pub subco_version: Option<String>,
}

impl UpdateNotification {
    /// Decodes a raw payload.
    pub fn parse(payload: &[u8]) -> Result<Self, UpdateError> {
        let value: serde_json::Value =
            serde_json::from_slice(payload).map_err(|e| UpdateError::Malformed {
                error: e.to_string(),
            })?;
        // serde would also accept a positional array for a struct.
        if !value.is_object() {
            return Err(UpdateError::WrongShape {
                error: "expected a JSON object".to_string(),
            });
        }
        serde_json::from_value(value).map_err(|e| UpdateError::WrongShape {
            error: e.to_string(),
        })
    }

    /// The explicit version override, if present and non-empty.
    pub fn override_version(&self) -> Option<&str> {
        self.versions
            .as_ref()
            .and_then(|v| v.subco_version.as_deref())
            .filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_payload() {
        let n = UpdateNotification::parse(
            br#"{"versions":{"subcoVersion":"5.0.0"},"imageVersions":["a","b"]}"#,
        )
        .unwrap();
        assert_eq!(n.override_version(), Some("5.0.0"));
        assert_eq!(n.image_versions, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_fields_are_independent() {
        let n = UpdateNotification::parse(br#"{"imageVersions":["c"]}"#).unwrap();
        assert_eq!(n.override_version(), None);
        assert!(n.image_versions.is_some());

        let n = UpdateNotification::parse(br#"{"versions":{"subcoVersion":"2.0.0"}}"#).unwrap();
        assert_eq!(n.override_version(), Some("2.0.0"));
        assert!(n.image_versions.is_none());
    }

    #[test]
    fn test_empty_override_is_absent() {
        let n = UpdateNotification::parse(br#"{"versions":{"subcoVersion":""}}"#).unwrap();
        assert_eq!(n.override_version(), None);

        let n = UpdateNotification::parse(br#"{"versions":null,"extra":1}"#).unwrap();
        assert_eq!(n.override_version(), None);
    }

    #[test]
    fn test_syntax_errors_are_malformed() {
        let cases: [&[u8]; 4] = [b"", b"{", b"not json", b"\xff\xfe"];
        for raw in cases {
            assert!(matches!(
                UpdateNotification::parse(raw),
                Err(UpdateError::Malformed { .. })
            ));
        }
    }

    #[test]
    fn test_shape_errors_are_rejected() {
        let cases: [&[u8]; 6] = [
            br#"[null,null]"#,
            br#""text""#,
            br#"{"imageVersions":"a"}"#,
            br#"{"imageVersions":[1]}"#,
            br#"{"versions":{"subcoVersion":5}}"#,
            br#"{"versions":"5.0.0"}"#,
        ];
        for raw in cases {
            assert!(
                matches!(
                    UpdateNotification::parse(raw),
                    Err(UpdateError::WrongShape { .. })
                ),
                "{}",
                String::from_utf8_lossy(raw)
            );
        }
    }
}
