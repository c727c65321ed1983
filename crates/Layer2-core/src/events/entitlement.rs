//! Entitlement events

use mirror_foundation::Entitlement;

passthrough_event!(
    /// A user subscribed to or bought an SKU
    EntitlementCreate, "ENTITLEMENT_CREATE", entitlement: Entitlement
);

passthrough_event!(
    /// Usually a renewal; `ends_at` moved
    EntitlementUpdate, "ENTITLEMENT_UPDATE", entitlement: Entitlement
);

passthrough_event!(EntitlementDelete, "ENTITLEMENT_DELETE", entitlement: Entitlement);
