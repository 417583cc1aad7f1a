//! Scan offload command encoding
//!
//! This module defines the configuration primitives the coordinator issues
//! to the radio and their on-the-wire encoding. Regular scan control uses the
//! standard LE controller commands; filter programming and batch buffering go
//! through the vendor-specific offload opcodes.

use super::constants::*;
use bitflags::bitflags;
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{Cursor, Write};

/// Convert a millisecond duration to 0.625 ms scan slots
pub fn ms_to_scan_slots(ms: u32) -> u32 {
    ms * 1000 / 625
}

bitflags! {
    /// Which fields of a programmed filter slot participate in matching
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FilterFeatures: u16 {
        const BROADCAST_ADDRESS = 0x01;
        const SERVICE_DATA_CHANGE = 0x02;
        const SERVICE_UUID = 0x04;
        const SOLICIT_UUID = 0x08;
        const LOCAL_NAME = 0x10;
        const MANUFACTURER_DATA = 0x20;
        const SERVICE_DATA = 0x40;
    }
}

/// How the controller reports a match against a programmed filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DeliveryMode {
    /// Report each match as it is seen
    Immediate = 0x00,
    /// Report first-seen and lost transitions only
    OnFoundLost = 0x01,
    /// Buffer matches for bulk readout
    Batch = 0x02,
}

/// Which batch result buffer a readout targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BatchReadKind {
    Truncated = 0x01,
    Full = 0x02,
}

/// One hardware filter entry, programmed into a single filter slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEntry {
    BroadcastAddress {
        addr: [u8; 6],
        addr_type: u8,
    },
    ServiceUuid {
        uuid: [u8; 16],
        mask: [u8; 16],
    },
    SolicitUuid {
        uuid: [u8; 16],
        mask: [u8; 16],
    },
    LocalName(String),
    ManufacturerData {
        company_id: u16,
        data: Vec<u8>,
        mask: Vec<u8>,
    },
    ServiceData {
        data: Vec<u8>,
        mask: Vec<u8>,
    },
}

impl FilterEntry {
    /// The vendor subcommand carrying this entry kind
    pub fn subcommand(&self) -> u8 {
        match self {
            Self::BroadcastAddress { .. } => APCF_SUBCMD_BROADCAST_ADDR,
            Self::ServiceUuid { .. } => APCF_SUBCMD_SERVICE_UUID,
            Self::SolicitUuid { .. } => APCF_SUBCMD_SOLICIT_UUID,
            Self::LocalName(_) => APCF_SUBCMD_LOCAL_NAME,
            Self::ManufacturerData { .. } => APCF_SUBCMD_MANU_DATA,
            Self::ServiceData { .. } => APCF_SUBCMD_SERVICE_DATA,
        }
    }

    fn write_payload(&self, cursor: &mut Cursor<Vec<u8>>) {
        match self {
            Self::BroadcastAddress { addr, addr_type } => {
                cursor.write_all(addr).unwrap();
                cursor.write_u8(*addr_type).unwrap();
            }
            Self::ServiceUuid { uuid, mask } | Self::SolicitUuid { uuid, mask } => {
                cursor.write_all(uuid).unwrap();
                cursor.write_all(mask).unwrap();
            }
            Self::LocalName(name) => {
                cursor.write_all(name.as_bytes()).unwrap();
            }
            Self::ManufacturerData {
                company_id,
                data,
                mask,
            } => {
                cursor.write_u16::<LittleEndian>(*company_id).unwrap();
                cursor.write_u8(data.len() as u8).unwrap();
                cursor.write_all(data).unwrap();
                cursor.write_all(mask).unwrap();
            }
            Self::ServiceData { data, mask } => {
                cursor.write_u8(data.len() as u8).unwrap();
                cursor.write_all(data).unwrap();
                cursor.write_all(mask).unwrap();
            }
        }
    }
}

/// Filter parameter record associating a slot with its matching behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterParams {
    pub index: u8,
    pub features: FilterFeatures,
    pub list_logic: u32,
    pub filter_logic: u8,
    pub rssi_high: i8,
    pub rssi_low: i8,
    pub delivery_mode: DeliveryMode,
    pub found_timeout_ms: u16,
    pub found_timeout_count: u8,
    pub lost_timeout_ms: u16,
}

/// Configuration primitives issued to the radio
///
/// Every variant is asynchronous at the hardware boundary: the command is
/// queued and a completion event arrives later on the ack path, keyed by
/// client identifier and status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioCommand {
    SetScanParams {
        window_ms: u16,
        interval_ms: u16,
    },
    EnableScan {
        enable: bool,
        filter_duplicates: bool,
    },
    AddFilterEntry {
        index: u8,
        entry: FilterEntry,
    },
    ClearFilterEntries {
        index: u8,
    },
    SetFilterParams(FilterParams),
    ClearFilterParams {
        index: u8,
    },
    ConfigureBatchStorage {
        full_pct: u8,
        truncated_pct: u8,
        notify_threshold_pct: u8,
    },
    StartBatchScan {
        window_ms: u32,
        interval_ms: u32,
        own_address_type: u8,
        discard_rule: u8,
    },
    StopBatchScan,
    ReadBatchReports {
        kind: BatchReadKind,
    },
}

impl RadioCommand {
    /// Get the OGF and OCF for this command
    pub fn opcode_parts(&self) -> (u8, u16) {
        match self {
            Self::SetScanParams { .. } => (OGF_LE_CTL, OCF_LE_SET_SCAN_PARAMETERS),
            Self::EnableScan { .. } => (OGF_LE_CTL, OCF_LE_SET_SCAN_ENABLE),
            Self::AddFilterEntry { .. }
            | Self::ClearFilterEntries { .. }
            | Self::SetFilterParams(_)
            | Self::ClearFilterParams { .. } => (OGF_VENDOR, OCF_ADV_FILTER),
            Self::ConfigureBatchStorage { .. }
            | Self::StartBatchScan { .. }
            | Self::StopBatchScan
            | Self::ReadBatchReports { .. } => (OGF_VENDOR, OCF_BATCH_SCAN),
        }
    }

    /// Convert the command to its raw parameter bytes
    fn parameters(&self) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());

        match self {
            Self::SetScanParams {
                window_ms,
                interval_ms,
            } => {
                cursor.write_u8(LE_SCAN_TYPE_ACTIVE).unwrap();
                cursor
                    .write_u16::<LittleEndian>(ms_to_scan_slots(*interval_ms as u32) as u16)
                    .unwrap();
                cursor
                    .write_u16::<LittleEndian>(ms_to_scan_slots(*window_ms as u32) as u16)
                    .unwrap();
                cursor.write_u8(LE_OWN_ADDRESS_PUBLIC).unwrap();
                cursor.write_u8(LE_FILTER_POLICY_ACCEPT_ALL).unwrap();
            }
            Self::EnableScan {
                enable,
                filter_duplicates,
            } => {
                cursor.write_u8(*enable as u8).unwrap();
                cursor.write_u8(*filter_duplicates as u8).unwrap();
            }
            Self::AddFilterEntry { index, entry } => {
                cursor.write_u8(entry.subcommand()).unwrap();
                cursor.write_u8(APCF_ACTION_ADD).unwrap();
                cursor.write_u8(*index).unwrap();
                entry.write_payload(&mut cursor);
            }
            Self::ClearFilterEntries { index } => {
                cursor.write_u8(APCF_SUBCMD_FILTERING_PARAM).unwrap();
                cursor.write_u8(APCF_ACTION_CLEAR).unwrap();
                cursor.write_u8(*index).unwrap();
            }
            Self::SetFilterParams(params) => {
                cursor.write_u8(APCF_SUBCMD_FILTERING_PARAM).unwrap();
                cursor.write_u8(APCF_ACTION_ADD).unwrap();
                cursor.write_u8(params.index).unwrap();
                cursor
                    .write_u16::<LittleEndian>(params.features.bits())
                    .unwrap();
                cursor.write_u32::<LittleEndian>(params.list_logic).unwrap();
                cursor.write_u8(params.filter_logic).unwrap();
                cursor.write_i8(params.rssi_high).unwrap();
                cursor.write_i8(params.rssi_low).unwrap();
                cursor.write_u8(params.delivery_mode as u8).unwrap();
                cursor
                    .write_u16::<LittleEndian>(params.found_timeout_ms)
                    .unwrap();
                cursor.write_u8(params.found_timeout_count).unwrap();
                cursor
                    .write_u16::<LittleEndian>(params.lost_timeout_ms)
                    .unwrap();
            }
            Self::ClearFilterParams { index } => {
                cursor.write_u8(APCF_SUBCMD_FILTERING_PARAM).unwrap();
                cursor.write_u8(APCF_ACTION_DELETE).unwrap();
                cursor.write_u8(*index).unwrap();
            }
            Self::ConfigureBatchStorage {
                full_pct,
                truncated_pct,
                notify_threshold_pct,
            } => {
                cursor.write_u8(BATCH_SUBCMD_SET_STORAGE).unwrap();
                cursor.write_u8(*full_pct).unwrap();
                cursor.write_u8(*truncated_pct).unwrap();
                cursor.write_u8(*notify_threshold_pct).unwrap();
            }
            Self::StartBatchScan {
                window_ms,
                interval_ms,
                own_address_type,
                discard_rule,
            } => {
                cursor.write_u8(BATCH_SUBCMD_SET_PARAMS).unwrap();
                cursor.write_u8(0x01).unwrap(); // enable
                cursor
                    .write_u32::<LittleEndian>(ms_to_scan_slots(*window_ms))
                    .unwrap();
                cursor
                    .write_u32::<LittleEndian>(ms_to_scan_slots(*interval_ms))
                    .unwrap();
                cursor.write_u8(*own_address_type).unwrap();
                cursor.write_u8(*discard_rule).unwrap();
            }
            Self::StopBatchScan => {
                cursor.write_u8(BATCH_SUBCMD_SET_PARAMS).unwrap();
                cursor.write_u8(0x00).unwrap(); // disable
            }
            Self::ReadBatchReports { kind } => {
                cursor.write_u8(BATCH_SUBCMD_READ_RESULTS).unwrap();
                cursor.write_u8(*kind as u8).unwrap();
            }
        }

        cursor.into_inner()
    }

    /// Convert the command to a raw HCI packet
    pub fn to_packet(&self) -> Vec<u8> {
        let (ogf, ocf) = self.opcode_parts();
        let opcode = ((ogf as u16) << 10) | (ocf & 0x3ff);
        let params = self.parameters();

        let mut packet = vec![HCI_COMMAND_PKT];
        packet.extend_from_slice(&opcode.to_le_bytes());
        packet.push(params.len() as u8);
        packet.extend_from_slice(&params);
        packet
    }
}
