// Packet framing
pub const HCI_COMMAND_PKT: u8 = 0x01;

// Opcode groups
pub const OGF_LE_CTL: u8 = 0x08;
pub const OGF_VENDOR: u8 = 0x3F;

// LE controller commands
pub const OCF_LE_SET_SCAN_PARAMETERS: u16 = 0x000B;
pub const OCF_LE_SET_SCAN_ENABLE: u16 = 0x000C;

// Vendor-specific scan offload commands
pub const OCF_BATCH_SCAN: u16 = 0x0156;
pub const OCF_ADV_FILTER: u16 = 0x0157;

// Batch scan subcommands
pub const BATCH_SUBCMD_SET_STORAGE: u8 = 0x01;
pub const BATCH_SUBCMD_SET_PARAMS: u8 = 0x02;
pub const BATCH_SUBCMD_READ_RESULTS: u8 = 0x03;

// Advertising filter subcommands
pub const APCF_SUBCMD_FILTERING_PARAM: u8 = 0x01;
pub const APCF_SUBCMD_BROADCAST_ADDR: u8 = 0x02;
pub const APCF_SUBCMD_SERVICE_UUID: u8 = 0x03;
pub const APCF_SUBCMD_SOLICIT_UUID: u8 = 0x04;
pub const APCF_SUBCMD_LOCAL_NAME: u8 = 0x05;
pub const APCF_SUBCMD_MANU_DATA: u8 = 0x06;
pub const APCF_SUBCMD_SERVICE_DATA: u8 = 0x07;

// Advertising filter actions
pub const APCF_ACTION_ADD: u8 = 0x00;
pub const APCF_ACTION_DELETE: u8 = 0x01;
pub const APCF_ACTION_CLEAR: u8 = 0x02;

// LE scan parameter fields
pub const LE_SCAN_TYPE_ACTIVE: u8 = 0x01;
pub const LE_OWN_ADDRESS_PUBLIC: u8 = 0x00;
pub const LE_FILTER_POLICY_ACCEPT_ALL: u8 = 0x00;

/// How long to wait for the controller to acknowledge one primitive before
/// proceeding as though it had.
pub const ACK_TIMEOUT_MS: u64 = 500;
