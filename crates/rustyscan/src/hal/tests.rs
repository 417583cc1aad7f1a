//! Unit tests for offload command encoding and the acknowledgment adapter

use super::command::*;
use super::constants::*;
use super::driver::*;
use crate::error::ScanResult;
use byteorder::{ByteOrder, LittleEndian};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[test]
fn test_scan_control_serialization() {
    // Set Scan Parameters: 2000 ms window, 5000 ms interval
    let command = RadioCommand::SetScanParams {
        window_ms: 2000,
        interval_ms: 5000,
    };
    let packet = command.to_packet();

    assert_eq!(packet[0], HCI_COMMAND_PKT);

    // Opcode: OGF_LE_CTL << 10 | OCF_LE_SET_SCAN_PARAMETERS
    let opcode = LittleEndian::read_u16(&packet[1..3]);
    assert_eq!(opcode, 0x200B);

    // Param length: 7
    assert_eq!(packet[3], 7);

    // Parameters: active scan, interval/window in 0.625 ms slots
    assert_eq!(packet[4], LE_SCAN_TYPE_ACTIVE);
    assert_eq!(LittleEndian::read_u16(&packet[5..7]), 8000); // 5000 ms
    assert_eq!(LittleEndian::read_u16(&packet[7..9]), 3200); // 2000 ms
    assert_eq!(packet[9], LE_OWN_ADDRESS_PUBLIC);
    assert_eq!(packet[10], LE_FILTER_POLICY_ACCEPT_ALL);

    // Scan enable
    let packet = RadioCommand::EnableScan {
        enable: true,
        filter_duplicates: true,
    }
    .to_packet();
    assert_eq!(LittleEndian::read_u16(&packet[1..3]), 0x200C);
    assert_eq!(packet[3], 2);
    assert_eq!(&packet[4..], &[0x01, 0x01]);
}

#[test]
fn test_filter_entry_serialization() {
    let command = RadioCommand::AddFilterEntry {
        index: 4,
        entry: FilterEntry::BroadcastAddress {
            addr: [0x01, 0x02, 0x03, 0x04, 0x05, 0x06],
            addr_type: 0,
        },
    };
    let packet = command.to_packet();

    // Opcode: OGF_VENDOR << 10 | OCF_ADV_FILTER
    let opcode = LittleEndian::read_u16(&packet[1..3]);
    assert_eq!(opcode, (0x3F << 10) | 0x0157);

    assert_eq!(packet[4], APCF_SUBCMD_BROADCAST_ADDR);
    assert_eq!(packet[5], APCF_ACTION_ADD);
    assert_eq!(packet[6], 4);
    assert_eq!(&packet[7..13], &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
    assert_eq!(packet[13], 0);

    // Manufacturer data carries company id, length-prefixed data, then mask
    let command = RadioCommand::AddFilterEntry {
        index: 5,
        entry: FilterEntry::ManufacturerData {
            company_id: 0x004C,
            data: vec![0xAA, 0xBB],
            mask: vec![0xFF, 0xFF],
        },
    };
    let packet = command.to_packet();
    assert_eq!(packet[4], APCF_SUBCMD_MANU_DATA);
    assert_eq!(LittleEndian::read_u16(&packet[7..9]), 0x004C);
    assert_eq!(packet[9], 2);
    assert_eq!(&packet[10..12], &[0xAA, 0xBB]);
    assert_eq!(&packet[12..14], &[0xFF, 0xFF]);
}

#[test]
fn test_filter_params_serialization() {
    let params = FilterParams {
        index: 3,
        features: FilterFeatures::SERVICE_UUID | FilterFeatures::LOCAL_NAME,
        list_logic: 0x1111_1111,
        filter_logic: 0x01,
        rssi_high: i8::MIN,
        rssi_low: i8::MIN,
        delivery_mode: DeliveryMode::Batch,
        found_timeout_ms: 5000,
        found_timeout_count: 1,
        lost_timeout_ms: 5000,
    };
    let packet = RadioCommand::SetFilterParams(params).to_packet();

    assert_eq!(packet[4], APCF_SUBCMD_FILTERING_PARAM);
    assert_eq!(packet[5], APCF_ACTION_ADD);
    assert_eq!(packet[6], 3);
    assert_eq!(LittleEndian::read_u16(&packet[7..9]), 0x14); // feature bits
    assert_eq!(LittleEndian::read_u32(&packet[9..13]), 0x1111_1111);
    assert_eq!(packet[13], 0x01);
    assert_eq!(packet[14] as i8, i8::MIN);
    assert_eq!(packet[15] as i8, i8::MIN);
    assert_eq!(packet[16], DeliveryMode::Batch as u8);
    assert_eq!(LittleEndian::read_u16(&packet[17..19]), 5000);
    assert_eq!(packet[19], 1);
    assert_eq!(LittleEndian::read_u16(&packet[20..22]), 5000);

    // Delete only names the slot
    let packet = RadioCommand::ClearFilterParams { index: 3 }.to_packet();
    assert_eq!(&packet[4..], &[APCF_SUBCMD_FILTERING_PARAM, APCF_ACTION_DELETE, 3]);
}

#[test]
fn test_batch_command_serialization() {
    let packet = RadioCommand::ConfigureBatchStorage {
        full_pct: 50,
        truncated_pct: 50,
        notify_threshold_pct: 95,
    }
    .to_packet();
    let opcode = LittleEndian::read_u16(&packet[1..3]);
    assert_eq!(opcode, (0x3F << 10) | 0x0156);
    assert_eq!(&packet[4..], &[BATCH_SUBCMD_SET_STORAGE, 50, 50, 95]);

    let packet = RadioCommand::StartBatchScan {
        window_ms: 1500,
        interval_ms: 5000,
        own_address_type: 0,
        discard_rule: 0,
    }
    .to_packet();
    assert_eq!(packet[4], BATCH_SUBCMD_SET_PARAMS);
    assert_eq!(packet[5], 0x01);
    assert_eq!(LittleEndian::read_u32(&packet[6..10]), 2400); // 1500 ms
    assert_eq!(LittleEndian::read_u32(&packet[10..14]), 8000); // 5000 ms

    let packet = RadioCommand::StopBatchScan.to_packet();
    assert_eq!(&packet[4..], &[BATCH_SUBCMD_SET_PARAMS, 0x00]);

    let packet = RadioCommand::ReadBatchReports {
        kind: BatchReadKind::Full,
    }
    .to_packet();
    assert_eq!(&packet[4..], &[BATCH_SUBCMD_READ_RESULTS, 0x02]);
}

#[test]
fn test_ms_to_scan_slots() {
    assert_eq!(ms_to_scan_slots(625), 1000);
    assert_eq!(ms_to_scan_slots(10), 16);
    assert_eq!(ms_to_scan_slots(150_000), 240_000);
}

struct RecordingHal {
    caps: ControllerCapabilities,
    log: Mutex<Vec<(ClientId, RadioCommand)>>,
    /// When set, completes the signal as the command is submitted
    ack: Option<Arc<AckSignal>>,
}

impl RadioHal for RecordingHal {
    fn capabilities(&self) -> ControllerCapabilities {
        self.caps
    }

    fn submit(&self, client: ClientId, command: RadioCommand) -> ScanResult<()> {
        self.log.lock().unwrap().push((client, command));
        if let Some(ack) = &self.ack {
            ack.complete();
        }
        Ok(())
    }
}

const CAPS: ControllerCapabilities = ControllerCapabilities {
    filtering_supported: true,
    max_filter_slots: 8,
};

#[test]
fn test_ack_signal_single_shot() {
    let signal = AckSignal::new();

    // No waiter armed: completion is dropped
    assert!(!signal.complete());

    let rx = signal.arm();
    assert!(signal.complete());
    assert!(rx.try_recv().is_ok());

    // Already consumed
    assert!(!signal.complete());
}

#[test]
fn test_ack_signal_rearm_invalidates_stale_waiter() {
    let signal = AckSignal::new();

    let stale = signal.arm();
    let fresh = signal.arm();

    assert!(signal.complete());
    // Only the most recent waiter observes the completion
    assert!(stale.recv_timeout(Duration::from_millis(10)).is_err());
    assert!(fresh.try_recv().is_ok());
}

#[test]
fn test_commander_waits_for_ack() {
    let signal = Arc::new(AckSignal::new());
    let hal = Arc::new(RecordingHal {
        caps: CAPS,
        log: Mutex::new(Vec::new()),
        ack: Some(Arc::clone(&signal)),
    });
    let commander = RadioCommander::new(hal.clone(), signal);

    assert!(commander.issue(7, RadioCommand::StopBatchScan));
    assert_eq!(hal.log.lock().unwrap().len(), 1);
}

#[test]
fn test_commander_times_out_without_ack() {
    let signal = Arc::new(AckSignal::new());
    let hal = Arc::new(RecordingHal {
        caps: CAPS,
        log: Mutex::new(Vec::new()),
        ack: None,
    });
    let commander = RadioCommander::new(hal, signal);

    let started = Instant::now();
    assert!(!commander.issue(7, RadioCommand::StopBatchScan));
    assert!(started.elapsed() >= Duration::from_millis(ACK_TIMEOUT_MS));
}
