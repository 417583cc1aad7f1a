//! Example demonstrating scan coordination over a stub radio
//!
//! Wires a loopback radio that acknowledges every primitive, then walks a
//! regular client and a batch client through their lifecycle.
//!
//! Run with: cargo run --example scan_coordinator

use rustyscan::{
    AdvReport, BdAddr, ClientId, ControllerCapabilities, RadioCommand, RadioHal, ResultKind,
    ScanClient, ScanManager, ScanPolicy, ScanMode, ScanResult, Uuid,
};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// A radio that prints every command packet and immediately confirms it
struct LoopbackRadio {
    events: Mutex<Sender<(ClientId, u8)>>,
}

impl RadioHal for LoopbackRadio {
    fn capabilities(&self) -> ControllerCapabilities {
        ControllerCapabilities {
            filtering_supported: true,
            max_filter_slots: 16,
        }
    }

    fn submit(&self, client: ClientId, command: RadioCommand) -> ScanResult<()> {
        println!("client {} -> {:02x?}", client, command.to_packet());
        let _ = self.events.lock().unwrap().send((client, 0));
        Ok(())
    }
}

fn main() -> ScanResult<()> {
    let (event_tx, event_rx) = mpsc::channel();
    let radio = Arc::new(LoopbackRadio {
        events: Mutex::new(event_tx),
    });
    let manager = Arc::new(ScanManager::new(radio)?);

    // Play radio completions back into the coordinator
    let ack_manager = Arc::clone(&manager);
    thread::spawn(move || {
        while let Ok((client, status)) = event_rx.recv() {
            ack_manager.on_hardware_ack(client, status);
        }
    });

    // A regular client interested in the battery service
    let mut client = ScanClient::new(1, ScanPolicy::new(ScanMode::Balanced));
    client.match_uuids = vec![Uuid::from_u16(0x180F)];
    client.callback = Some(Arc::new(|report: &AdvReport| {
        println!("match from {} at {} dBm", report.address, report.rssi);
    }));
    manager.start_scan(client)?;

    // A batch client buffering truncated results for two seconds at a time
    let mut policy = ScanPolicy::new(ScanMode::LowPower);
    policy.report_delay_ms = 2000;
    policy.result_kind = ResultKind::Truncated;
    manager.start_scan(ScanClient::new(2, policy))?;

    thread::sleep(Duration::from_millis(200));

    // A battery-service advertisement arrives
    manager.on_scan_result(
        BdAddr::new([0x66, 0x55, 0x44, 0x33, 0x22, 0x11]),
        -58,
        &[0x02, 0x01, 0x06, 0x03, 0x03, 0x0F, 0x18],
    );

    manager.flush_batch(2)?;
    thread::sleep(Duration::from_millis(200));

    manager.stop_scan(1, false)?;
    manager.stop_scan(2, false)?;
    thread::sleep(Duration::from_millis(200));

    println!("done");
    Ok(())
}
