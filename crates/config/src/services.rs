use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::collections::BTreeMap;
use tagport_import::{ServiceKey, ServiceRegistry};

const COMBINED_TAG_SERVICE_NAME: &str = "all known tags";

/// Named tag services, as configured.
///
/// The combined service is always known, as `all known tags`, unless the
/// configuration names it something else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Services {
    keys: BTreeMap<String, ServiceKey>,
}
impl Services {
    pub(crate) fn from_hex(services: &BTreeMap<String, String>) -> Result<Self> {
        let keys = services
            .iter()
            .map(|(name, hex)| -> Result<(String, ServiceKey)> {
                let key = hex.parse::<ServiceKey>().or_raise(|| ErrorKind::invalid(format!("services.{name}")))?;
                Ok((name.clone(), key))
            })
            .collect::<Result<_>>()?;
        Ok(Self { keys })
    }

    /// Looks a service up by name.
    pub fn key(&self, name: &str) -> Option<ServiceKey> {
        match self.keys.get(name) {
            Some(key) => Some(key.clone()),
            None if name == COMBINED_TAG_SERVICE_NAME => Some(ServiceKey::combined_tags()),
            None => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ServiceKey)> {
        self.keys.iter().map(|(name, key)| (name.as_str(), key))
    }
}
impl ServiceRegistry for Services {
    fn name(&self, service: &ServiceKey) -> Option<String> {
        match self.keys.iter().find(|(_, key)| *key == service) {
            Some((name, _)) => Some(name.clone()),
            None if *service == ServiceKey::combined_tags() => Some(COMBINED_TAG_SERVICE_NAME.to_string()),
            None => None,
        }
    }
}
