//! Key distribution.
//!
//! Two ways to hand out keys named `"<base> #<n>"` with consecutive numbers:
//! - offers, one per receiver, which each receiver claims later
//! - direct transfers to a single receiver that co-signs every transaction
//!
//! After a halt the operator re-runs from the reported start number.

use crate::batch::BatchItem;
use crate::ledger::types::{AccountAddress, Call, EntryFunctionId, LedgerResult};

/// One key going to one receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDelivery {
    pub receiver: AccountAddress,
    pub key_number: u64,
}

impl BatchItem for KeyDelivery {
    fn units(&self) -> u64 {
        1
    }
}

/// Offers keys of one collection through the token transfer module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDistribution {
    pub creator: AccountAddress,
    pub collection_name: String,
    pub base_token_name: String,
    pub property_version: u64,
}

impl KeyDistribution {
    /// Pair receivers with consecutive key numbers from `starting_key_number`.
    pub fn plan(receivers: &[AccountAddress], starting_key_number: u64) -> Vec<KeyDelivery> {
        receivers
            .iter()
            .zip(starting_key_number..)
            .map(|(receiver, key_number)| KeyDelivery {
                receiver: *receiver,
                key_number,
            })
            .collect()
    }

    pub fn token_name(&self, key_number: u64) -> String {
        format!("{} #{}", self.base_token_name, key_number)
    }

    /// `count` consecutive keys from `starting_key_number`, all to `receiver`.
    pub fn plan_direct(
        receiver: AccountAddress,
        starting_key_number: u64,
        count: u64,
    ) -> Vec<KeyDelivery> {
        (starting_key_number..starting_key_number.saturating_add(count))
            .map(|key_number| KeyDelivery {
                receiver,
                key_number,
            })
            .collect()
    }

    /// `0x3::token::direct_transfer_script` for one delivery. The receiver
    /// must co-sign the transaction.
    pub fn direct_transfer(&self, delivery: &KeyDelivery) -> LedgerResult<Call> {
        let function = EntryFunctionId::new("0x3".parse()?, "token", "direct_transfer_script")?;
        Ok(Call::new(function)
            .address_arg(&self.creator)
            .string_arg(&self.collection_name)
            .string_arg(self.token_name(delivery.key_number))
            .u64_arg(self.property_version)
            .u64_arg(1))
    }

    /// `0x3::token_transfers::offer_script` for one delivery.
    pub fn offer(&self, delivery: &KeyDelivery) -> LedgerResult<Call> {
        let function = EntryFunctionId::new("0x3".parse()?, "token_transfers", "offer_script")?;
        Ok(Call::new(function)
            .address_arg(&delivery.receiver)
            .address_arg(&self.creator)
            .string_arg(&self.collection_name)
            .string_arg(self.token_name(delivery.key_number))
            .u64_arg(self.property_version)
            .u64_arg(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plan_numbers_keys_from_start() {
        let receivers: Vec<AccountAddress> = ["0x1", "0x2", "0x3"]
            .iter()
            .map(|a| a.parse().unwrap())
            .collect();
        let plan = KeyDistribution::plan(&receivers, 20);
        let numbers: Vec<u64> = plan.iter().map(|d| d.key_number).collect();
        assert_eq!(numbers, vec![20, 21, 22]);
        assert_eq!(plan[2].receiver, receivers[2]);
        assert_eq!(plan[0].units(), 1);
    }

    #[test]
    fn test_offer_call() {
        let distribution = KeyDistribution {
            creator: "0xc0".parse().unwrap(),
            collection_name: "Keys".into(),
            base_token_name: "Test".into(),
            property_version: 0,
        };
        let delivery = KeyDelivery {
            receiver: "0x7f".parse().unwrap(),
            key_number: 5,
        };
        let call = distribution.offer(&delivery).unwrap();
        assert_eq!(call.function().module, "token_transfers");
        assert_eq!(call.arguments()[3], json!("Test #5"));
        assert_eq!(call.arguments()[5], json!("1"));
    }

    #[test]
    fn test_direct_transfer_plan_and_call() {
        let receiver: AccountAddress = "0x7f".parse().unwrap();
        let plan = KeyDistribution::plan_direct(receiver, 20, 3);
        let numbers: Vec<u64> = plan.iter().map(|d| d.key_number).collect();
        assert_eq!(numbers, vec![20, 21, 22]);
        assert!(plan.iter().all(|d| d.receiver == receiver));

        let distribution = KeyDistribution {
            creator: "0xc0".parse().unwrap(),
            collection_name: "Keys".into(),
            base_token_name: "Test".into(),
            property_version: 0,
        };
        let call = distribution.direct_transfer(&plan[1]).unwrap();
        assert_eq!(call.function().address, "0x3".parse().unwrap());
        assert_eq!(call.function().module, "token");
        assert_eq!(call.function().function, "direct_transfer_script");
        assert_eq!(
            call.arguments(),
            &[
                json!("0x00000000000000000000000000000000000000000000000000000000000000c0"),
                json!("Keys"),
                json!("Test #21"),
                json!("0"),
                json!("1"),
            ]
        );
    }
}
