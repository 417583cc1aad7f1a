// Reserved filter slots. Slot 0 belongs to the system-wide pass-all filter
// and is never touched here; 1 and 2 back the shared pass-all filters for
// regular and batch scans.
pub const SYSTEM_ALL_PASS_INDEX: u8 = 0;
pub const REGULAR_ALL_PASS_INDEX: u8 = 1;
pub const BATCH_ALL_PASS_INDEX: u8 = 2;
pub const FIRST_ALLOCATABLE_INDEX: u8 = 3;

// Regular scan window/interval per power tier (ms)
pub const SCAN_MODE_LOW_POWER_WINDOW_MS: u16 = 500;
pub const SCAN_MODE_LOW_POWER_INTERVAL_MS: u16 = 5000;
pub const SCAN_MODE_BALANCED_WINDOW_MS: u16 = 2000;
pub const SCAN_MODE_BALANCED_INTERVAL_MS: u16 = 5000;
pub const SCAN_MODE_LOW_LATENCY_WINDOW_MS: u16 = 5000;
pub const SCAN_MODE_LOW_LATENCY_INTERVAL_MS: u16 = 5000;

// Batch scan window/interval per power tier (ms)
pub const BATCH_SCAN_LOW_POWER_WINDOW_MS: u32 = 1500;
pub const BATCH_SCAN_LOW_POWER_INTERVAL_MS: u32 = 150_000;
pub const BATCH_SCAN_BALANCED_WINDOW_MS: u32 = 1500;
pub const BATCH_SCAN_BALANCED_INTERVAL_MS: u32 = 15_000;
pub const BATCH_SCAN_LOW_LATENCY_WINDOW_MS: u32 = 1500;
pub const BATCH_SCAN_LOW_LATENCY_INTERVAL_MS: u32 = 5000;

// Fixed filter parameter fields. Groups AND their fields together and no
// RSSI gating is applied.
pub const LIST_LOGIC_TYPE_ALL: u32 = 0x1111_1111;
pub const FILTER_LOGIC_TYPE_AND: u8 = 0x01;
pub const RSSI_THRESHOLD_UNFILTERED: i8 = i8::MIN;
pub const ON_FOUND_SIGHTINGS: u8 = 1;

// Batch storage configuration
pub const BATCH_NOTIFY_THRESHOLD_PCT: u8 = 95;
pub const BATCH_OWN_ADDRESS_TYPE: u8 = 0x00;
pub const BATCH_DISCARD_OLDEST: u8 = 0x00;

/// The flush alarm may fire anywhere within `interval + interval / 10`,
/// letting the platform coalesce wake-ups.
pub const FLUSH_WINDOW_DIVISOR: u32 = 10;
