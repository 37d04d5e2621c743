//! Strongly-typed document identifiers used across the domain.
//!
//! The backing store keys documents by opaque strings (`"studio-1"`,
//! `"studio-1-a7s3-u2"`, ...), so identifiers wrap `String` rather than a
//! UUID. Freshly minted ids use UUIDv7 text.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of a studio (physical room).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudioId(String);

/// Identifier of an equipment definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EquipmentId(String);

/// Identifier of a single physical unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

/// Identifier of a maintenance history record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaintenanceRecordId(String);

macro_rules! impl_document_id {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Mint a fresh identifier (UUIDv7 text).
            ///
            /// Prefer passing IDs explicitly in tests for determinism.
            pub fn generate() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::invalid_id(format!("{}: empty", $name)));
                }
                Ok(Self(trimmed.to_string()))
            }
        }
    };
}

impl_document_id!(StudioId, "StudioId");
impl_document_id!(EquipmentId, "EquipmentId");
impl_document_id!(UnitId, "UnitId");
impl_document_id!(MaintenanceRecordId, "MaintenanceRecordId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_blank_ids() {
        let err = "  ".parse::<UnitId>().unwrap_err();
        assert_eq!(err, DomainError::InvalidId("UnitId: empty".into()));
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(MaintenanceRecordId::generate(), MaintenanceRecordId::generate());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = StudioId::from("studio-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"studio-1\"");
    }
}
