//! Typed Uuids
//!
//! One newtype per record family so a customer id can never be passed where a
//! company id is expected.

use std::fmt::{Display, Formatter, Result as FmtResult};

use uuid::Uuid;

macro_rules! typed_uuid {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Uuid);

        impl $name {
            /// Wraps a raw [`Uuid`].
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Unwraps back to the raw [`Uuid`].
            #[must_use]
            pub const fn into_uuid(self) -> Uuid {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
                Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self::from_uuid(value)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.into_uuid()
            }
        }
    };
}

typed_uuid!(
    /// Identifies a customer.
    CustomerUuid
);

typed_uuid!(
    /// Identifies a company a customer may be affiliated with.
    CompanyUuid
);

typed_uuid!(
    /// Identifies a store.
    StoreUuid
);

typed_uuid!(
    /// Identifies an order.
    OrderUuid
);
