//! Payload builders for the collection programs.
//!
//! Each function returns a [`Call`]; nothing here touches the network.
//! Argument order follows the on-chain entry function signatures.

pub mod distribution;
pub mod gen2;
pub mod keys;

use crate::ledger::types::{AccountAddress, Call, EntryFunctionId, LedgerResult, OCTAS_PER_APT};

pub use distribution::{KeyDelivery, KeyDistribution};
pub use gen2::{CreatorConfig, Gen2Program, TokenAsset};
pub use keys::{DestinationCollectionConfig, KeyBatch, KeysCollectionConfig, KeysProgram};

/// Module name both programs publish their entry functions under.
pub const MINTING_MODULE: &str = "minting";

/// Gas budget for calls known to exceed the default.
pub const HEAVY_MAX_GAS: u64 = 2_000_000;

fn minting_call(address: AccountAddress, function: &str) -> LedgerResult<Call> {
    Ok(Call::new(EntryFunctionId::new(
        address,
        MINTING_MODULE,
        function,
    )?))
}

/// Parse a decimal APT amount (e.g. `4.55`) into octas without float rounding.
pub fn parse_apt(amount: &str) -> Result<u64, String> {
    let amount = amount.trim();
    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (amount, ""),
    };

    if (whole.is_empty() && fraction.is_empty())
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(format!("'{}' is not a decimal APT amount", amount));
    }
    if fraction.len() > 8 {
        return Err(format!("'{}' has more than 8 decimal places", amount));
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|e| format!("'{}': {}", amount, e))?
    };
    let fraction: u64 = if fraction.is_empty() {
        0
    } else {
        format!("{:0<8}", fraction)
            .parse()
            .map_err(|e| format!("'{}': {}", amount, e))?
    };

    whole
        .checked_mul(OCTAS_PER_APT)
        .and_then(|w| w.checked_add(fraction))
        .ok_or_else(|| format!("'{}' is too large", amount))
}
