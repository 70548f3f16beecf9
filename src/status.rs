//! Machine status as reported by `vagrant status --machine-readable`.

use std::collections::BTreeMap;
use std::fmt;

use crate::machine_readable::Record;

/// Lifecycle state of a Vagrant machine.
///
/// Covers the states emitted by the common providers (VirtualBox, libvirt,
/// Hyper-V, VMware, Docker, LXC). Anything else maps to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MachineState {
    NotCreated,
    Running,
    Poweroff,
    Saved,
    Aborted,
    Paused,
    Stopped,
    Shutoff,
    Suspended,
    Frozen,
    GuruMeditation,
    Inaccessible,
    #[default]
    Unknown,
}

impl MachineState {
    /// The spelling Vagrant uses on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            MachineState::NotCreated => "not_created",
            MachineState::Running => "running",
            MachineState::Poweroff => "poweroff",
            MachineState::Saved => "saved",
            MachineState::Aborted => "aborted",
            MachineState::Paused => "paused",
            MachineState::Stopped => "stopped",
            MachineState::Shutoff => "shutoff",
            MachineState::Suspended => "suspended",
            MachineState::Frozen => "frozen",
            MachineState::GuruMeditation => "gurumeditation",
            MachineState::Inaccessible => "inaccessible",
            MachineState::Unknown => "unknown",
        }
    }

    /// Whether the guest is up and reachable.
    pub fn is_running(self) -> bool {
        matches!(self, MachineState::Running)
    }
}

impl From<&str> for MachineState {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "not_created" | "not created" => MachineState::NotCreated,
            "running" => MachineState::Running,
            "poweroff" | "off" => MachineState::Poweroff,
            "saved" => MachineState::Saved,
            "aborted" => MachineState::Aborted,
            "paused" => MachineState::Paused,
            "stopped" => MachineState::Stopped,
            "shutoff" => MachineState::Shutoff,
            "suspended" => MachineState::Suspended,
            "frozen" => MachineState::Frozen,
            "gurumeditation" => MachineState::GuruMeditation,
            "inaccessible" => MachineState::Inaccessible,
            _ => MachineState::Unknown,
        }
    }
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MachineStatus {
    pub name: String,
    pub provider: String,
    pub state: MachineState,
}

/// Fold records into one status per named machine, sorted by name.
///
/// Global records (empty target) are skipped, as are record kinds other
/// than `provider-name` and `state`.
pub fn build_statuses(records: &[Record]) -> Vec<MachineStatus> {
    let mut by_name: BTreeMap<&str, MachineStatus> = BTreeMap::new();

    for record in records {
        if record.target.is_empty() {
            continue;
        }

        let status = by_name
            .entry(record.target.as_str())
            .or_insert_with(|| MachineStatus {
                name: record.target.clone(),
                ..Default::default()
            });

        let first = record.data.first().map(String::as_str);
        match record.kind.as_str() {
            "provider-name" => status.provider = first.unwrap_or_default().to_string(),
            "state" => status.state = first.map(MachineState::from).unwrap_or_default(),
            _ => {}
        }
    }

    by_name.into_values().collect()
}
