use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;

use crate::wallet::{PaymentTransaction, QueryChannel};
use crate::{ParkingMeter, ProviderError};

/// ABI-encode `getCostToPark(timeInMinutes, locationId)`.
pub fn cost_to_park_calldata(duration: U256, location: U256) -> Bytes {
    ParkingMeter::getCostToParkCall {
        timeInMinutes: duration,
        locationId: location,
    }
    .abi_encode()
    .into()
}

/// Decode the `uint256` returned by `getCostToPark`.
pub fn decode_cost(data: &[u8]) -> Result<U256, ProviderError> {
    ParkingMeter::getCostToParkCall::abi_decode_returns(data)
        .map_err(|e| ProviderError::Decode(format!("getCostToPark returned {} bytes: {e}", data.len())))
}

/// Query the price of parking at `location` for `duration` minutes, in wei.
pub async fn cost_to_park<Q: QueryChannel>(
    query: &Q,
    contract: Address,
    duration: U256,
    location: U256,
) -> Result<U256, ProviderError> {
    let output = query
        .call(contract, cost_to_park_calldata(duration, location))
        .await?;
    decode_cost(&output)
}

/// Build the payable `park(locationId, licensePlate, timeInMinutes)` call.
pub fn park_transaction(
    from: Address,
    contract: Address,
    location: U256,
    license_plate: &str,
    duration: u16,
    value: U256,
) -> PaymentTransaction {
    let data = ParkingMeter::parkCall {
        locationId: location,
        licensePlate: license_plate.to_string(),
        timeInMinutes: duration,
    }
    .abi_encode();

    PaymentTransaction {
        from,
        to: contract,
        value,
        data: data.into(),
    }
}
