use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(NotificationKind {
    HealthTip => "health_tip",
    System => "system",
});

impl Default for NotificationKind {
    fn default() -> Self {
        Self::HealthTip
    }
}

str_enum!(Role {
    Patient => "patient",
    Doctor => "doctor",
    Student => "student",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn notification_kind_round_trip() {
        for (variant, s) in [
            (NotificationKind::HealthTip, "health_tip"),
            (NotificationKind::System, "system"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(NotificationKind::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn notification_kind_defaults_to_health_tip() {
        assert_eq!(NotificationKind::default(), NotificationKind::HealthTip);
    }

    #[test]
    fn role_round_trip() {
        for (variant, s) in [
            (Role::Patient, "patient"),
            (Role::Doctor, "doctor"),
            (Role::Student, "student"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Role::from_str(s).unwrap(), variant);
            assert_eq!(variant.to_string(), s);
        }
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&NotificationKind::HealthTip).unwrap();
        assert_eq!(json, "\"health_tip\"");
        let role: Role = serde_json::from_str("\"doctor\"").unwrap();
        assert_eq!(role, Role::Doctor);
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(NotificationKind::from_str("promo").is_err());
        assert!(Role::from_str("admin").is_err());
        assert!(Role::from_str("").is_err());
    }
}
