//! Build-time configuration.
//!
//! Values are baked in from the environment at compile time, e.g.
//! `PARKING_CONTRACT_ADDRESS=0x... trunk build`.

use parking_meter::{ConfigSource, ParkingConfig, ParkingError};

const SOURCE: ConfigSource<'static> = ConfigSource {
    contract_address: option_env!("PARKING_CONTRACT_ADDRESS"),
    quote_ordering: option_env!("PARKING_QUOTE_ORDERING"),
    poll_interval_ms: option_env!("PARKING_POLL_INTERVAL_MS"),
    explorer_base: option_env!("PARKING_EXPLORER_URL"),
};

/// Parse the configuration this build was compiled with.
pub fn load() -> Result<ParkingConfig, ParkingError> {
    ParkingConfig::from_source(&SOURCE)
}
