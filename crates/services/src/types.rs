use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! impl_id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        #[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
        pub struct $name(pub Uuid);

        impl $name {
            /// Fresh random id
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

// The tenant is the account that owns invoices, contracts and the subscription
impl_id_type!(TenantId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_id_creation() {
        assert_ne!(TenantId::new(), TenantId::new());
    }

    #[test]
    fn test_id_conversion() {
        let uuid = Uuid::new_v4();
        let tenant_id = TenantId::from(uuid);
        let back_to_uuid: Uuid = tenant_id.into();
        assert_eq!(uuid, back_to_uuid);
    }

    #[test]
    fn test_id_display_and_parse() {
        let uuid = Uuid::new_v4();
        let tenant_id: TenantId = uuid.to_string().parse().unwrap();
        assert_eq!(format!("{tenant_id}"), uuid.to_string());
        assert_eq!(Uuid::from(tenant_id), uuid);
    }

    #[test]
    fn test_id_serde_is_transparent() {
        let uuid = Uuid::new_v4();
        let json = serde_json::to_string(&TenantId(uuid)).unwrap();
        assert_eq!(json, format!("\"{uuid}\""));
    }
}
