use crate::error::{PipelineError, Result};
use netsketch_graph::{DeviceRecord, InterfaceRecord, TopologyRecord};
use netsketch_model::DeviceKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

const TOPOLOGY_FILE_NAME: &str = "topology.json";
const HOST_VARS_DIR_NAME: &str = "host_vars";
const GROUP_VARS_DIR_NAME: &str = "group_vars";
const GROUP_VARS_FILE_NAME: &str = "all.yml";

const ANSIBLE_CONNECTION: &str = "network_cli";
const ANSIBLE_USER: &str = "<USERNAME>";
const ANSIBLE_NETWORK_OS: &str = "ios";
const ACCESS_PORT: &str = "access";
const DEFAULT_SWITCH_VLAN: u16 = 1;

/// Per-device inventory variables consumed by configuration playbooks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostVars {
    pub ansible_connection: String,
    pub ansible_user: String,
    pub ansible_network_os: String,
    pub hostname: String,
    pub device_type: DeviceKind,
    pub interfaces: BTreeMap<String, PortVars>,
}

/// Interface entry of a [`HostVars`] file.
///
/// Router ports are marked `up`; switch ports are access ports and fall
/// back to VLAN 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortVars {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl PortVars {
    fn new(kind: DeviceKind, iface: &InterfaceRecord) -> Self {
        let mut port = Self {
            ip: iface.ip.clone(),
            protocol: iface.protocol.clone(),
            vlan: iface.vlan,
            ..Self::default()
        };
        match kind {
            DeviceKind::Router => port.status = Some("up".to_string()),
            DeviceKind::Switch => {
                port.port_mode = Some(ACCESS_PORT.to_string());
                port.vlan = Some(iface.vlan.unwrap_or(DEFAULT_SWITCH_VLAN));
            }
            _ => {}
        }
        port
    }
}

impl HostVars {
    fn new(hostname: &str, device: &DeviceRecord) -> Self {
        Self {
            ansible_connection: ANSIBLE_CONNECTION.to_string(),
            ansible_user: ANSIBLE_USER.to_string(),
            ansible_network_os: ANSIBLE_NETWORK_OS.to_string(),
            hostname: hostname.to_string(),
            device_type: device.device_type,
            interfaces: device
                .interfaces
                .iter()
                .map(|(name, iface)| (name.clone(), PortVars::new(device.device_type, iface)))
                .collect(),
        }
    }
}

/// Directory holding a saved topology and its Ansible inventory:
///
/// ```text
/// <root>/topology.json
/// <root>/host_vars/<hostname>.yml
/// <root>/group_vars/all.yml
/// ```
#[derive(Debug, Clone)]
pub struct TopologyStore {
    root: PathBuf,
}

impl TopologyStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn topology_path(&self) -> PathBuf {
        self.root.join(TOPOLOGY_FILE_NAME)
    }

    pub fn group_vars_path(&self) -> PathBuf {
        self.root.join(GROUP_VARS_DIR_NAME).join(GROUP_VARS_FILE_NAME)
    }

    pub fn host_vars_path(&self, hostname: &str) -> Result<PathBuf> {
        check_file_name(hostname)?;
        Ok(self
            .root
            .join(HOST_VARS_DIR_NAME)
            .join(format!("{hostname}.yml")))
    }

    /// Replace the saved topology. Host files of devices no longer present
    /// are removed.
    pub async fn save(&self, record: &TopologyRecord) -> Result<()> {
        for hostname in record.hostnames() {
            check_file_name(hostname)?;
        }

        let host_dir = self.root.join(HOST_VARS_DIR_NAME);
        tokio::fs::create_dir_all(&host_dir).await?;
        tokio::fs::create_dir_all(self.root.join(GROUP_VARS_DIR_NAME)).await?;
        write_atomic(&self.topology_path(), &serde_json::to_vec_pretty(record)?).await?;

        let mut nodes = BTreeMap::new();
        for (hostname, device) in record.devices() {
            let vars = HostVars::new(hostname, device);
            let yaml = serde_yaml::to_string(&vars)?;
            write_atomic(&self.host_vars_path(hostname)?, yaml.as_bytes()).await?;
            nodes.insert(hostname.to_string(), vars);
        }
        let all = serde_yaml::to_string(&nodes)?;
        write_atomic(&self.group_vars_path(), all.as_bytes()).await?;

        let current: HashSet<String> = record.hostnames().map(|h| format!("{h}.yml")).collect();
        let mut entries = tokio::fs::read_dir(&host_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".yml") && !current.contains(&name) {
                log::debug!("Removing stale host file {name}");
                tokio::fs::remove_file(entry.path()).await?;
            }
        }

        log::info!("Saved {} devices to {}", record.len(), self.root.display());
        Ok(())
    }

    /// Saved topology, or `None` when nothing was saved yet
    pub async fn load(&self) -> Result<Option<TopologyRecord>> {
        let path = self.topology_path();
        if !path.exists() {
            return Ok(None);
        }
        let bytes = tokio::fs::read(&path).await?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    pub async fn load_host(&self, hostname: &str) -> Result<Option<HostVars>> {
        let path = self.host_vars_path(hostname)?;
        if !path.exists() {
            return Ok(None);
        }
        let bytes = tokio::fs::read(&path).await?;
        Ok(Some(serde_yaml::from_slice(&bytes)?))
    }

    /// Every device's inventory variables from `group_vars/all.yml`
    pub async fn load_inventory(&self) -> Result<Option<BTreeMap<String, HostVars>>> {
        let path = self.group_vars_path();
        if !path.exists() {
            return Ok(None);
        }
        let bytes = tokio::fs::read(&path).await?;
        Ok(Some(serde_yaml::from_slice(&bytes)?))
    }
}

fn check_file_name(hostname: &str) -> Result<()> {
    let bad = hostname.is_empty()
        || hostname.starts_with('.')
        || hostname.contains(['/', '\\', '\0']);
    if bad {
        return Err(PipelineError::InvalidHostname(hostname.to_string()));
    }
    Ok(())
}

/// Atomic replace through a sibling temporary file
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn iface(ip: Option<&str>, vlan: Option<u16>) -> InterfaceRecord {
        InterfaceRecord {
            ip: ip.map(str::to_string),
            protocol: None,
            vlan,
        }
    }

    #[test]
    fn switch_ports_default_to_access_on_vlan_one() {
        let port = PortVars::new(DeviceKind::Switch, &iface(None, None));
        assert_eq!(port.port_mode.as_deref(), Some("access"));
        assert_eq!(port.vlan, Some(1));
        assert_eq!(port.status, None);

        let tagged = PortVars::new(DeviceKind::Switch, &iface(None, Some(30)));
        assert_eq!(tagged.vlan, Some(30));
    }

    #[test]
    fn router_ports_are_up_and_host_ports_carry_only_addresses() {
        let router = PortVars::new(DeviceKind::Router, &iface(Some("10.0.0.1/30"), None));
        assert_eq!(router.status.as_deref(), Some("up"));
        assert_eq!(router.port_mode, None);

        let pc = PortVars::new(DeviceKind::Pc, &iface(Some("10.0.0.2/24"), None));
        assert_eq!(
            pc,
            PortVars {
                ip: Some("10.0.0.2/24".to_string()),
                ..PortVars::default()
            }
        );
    }

    #[test]
    fn port_mode_is_written_in_camel_case() {
        let port = PortVars::new(DeviceKind::Switch, &iface(None, None));
        let yaml = serde_yaml::to_string(&port).unwrap();
        assert_eq!(yaml, "portMode: access\nvlan: 1\n");
    }

    #[test]
    fn hostnames_that_escape_the_directory_are_rejected() {
        let store = TopologyStore::new("/tmp/project");
        assert!(store.host_vars_path("R1").is_ok());
        for bad in ["", "../R1", ".hidden", "a/b"] {
            assert!(matches!(
                store.host_vars_path(bad),
                Err(PipelineError::InvalidHostname(_))
            ));
        }
    }
}
