//! Application-wide names shared by the CRD client and the metric definitions.

/// Application name, used as the metric namespace
pub const APP_NAME: &str = "directpv";

/// Human readable application name
pub const APP_PRETTY_NAME: &str = "DirectPV";

/// API group of the DirectPV custom resources
pub const GROUP_NAME: &str = "directpv.min.io";

/// Served version of the volume custom resource
pub const VERSION: &str = "v1beta1";

pub const VOLUME_KIND: &str = "DirectPVVolume";
pub const VOLUME_PLURAL: &str = "directpvvolumes";

/// Label carrying the node a volume is bound to
pub const NODE_LABEL: &str = "directpv.min.io/node";

/// Optional label used for multi-tenant reporting
pub const TENANT_LABEL: &str = "directpv.min.io/tenant";
