//! Junos resource types
//!
//! Each submodule maps one Junos configuration object onto a typed
//! attribute set:
//! - `junos_application` - custom applications with optional terms
//! - `junos_application_set` - groups of applications
//! - `junos_security_policy` - zone-pair security policies
//! - `junos_security_ike_proposal` - IKE proposals
//! - `junos_security_ipsec_proposal` - IPsec proposals
//! - `junos_system_syslog_file` - syslog file destinations

mod application;
mod application_set;
mod ike_proposal;
mod ipsec_proposal;
mod security_policy;
mod syslog_file;

pub use application::{Application, Term};
pub use application_set::ApplicationSet;
pub use ike_proposal::IkeProposal;
pub use ipsec_proposal::IpsecProposal;
pub use security_policy::{Policy, SecurityPolicy};
pub use syslog_file::{StructuredData, SyslogFile};

use declarative::Registry;
use setline::{int_value, required, text_value};

/// Every resource type this binary manages
pub fn registry() -> Registry {
    Registry::new()
        .with::<Application>()
        .with::<ApplicationSet>()
        .with::<SecurityPolicy>()
        .with::<IkeProposal>()
        .with::<IpsecProposal>()
        .with::<SyslogFile>()
}

/// serde helper: flags are stored only when set
pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

/// Decode a required word or text value
pub(crate) fn text(keyword: &str, value: &str) -> setline::Result<Option<String>> {
    Ok(Some(text_value(required(keyword, value)?)))
}

/// Decode a required integer value
pub(crate) fn int(keyword: &str, value: &str) -> setline::Result<Option<i64>> {
    Ok(Some(int_value(keyword, required(keyword, value)?)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_every_type() {
        let registry = registry();
        let names: Vec<_> = registry.type_names().collect();
        assert_eq!(
            names,
            vec![
                "junos_application",
                "junos_application_set",
                "junos_security_ike_proposal",
                "junos_security_ipsec_proposal",
                "junos_security_policy",
                "junos_system_syslog_file",
            ]
        );
    }

    #[test]
    fn test_value_helpers() {
        assert_eq!(text("protocol", "tcp").unwrap(), Some("tcp".to_string()));
        assert_eq!(text("description", "\"a b\"").unwrap(), Some("a b".to_string()));
        assert!(text("protocol", "").is_err());
        assert_eq!(int("inactivity-timeout", "300").unwrap(), Some(300));
        assert!(int("inactivity-timeout", "3x").is_err());
    }
}
