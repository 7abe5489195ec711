// Path: crates/jam-vm/src/testutil.rs

//! Context-building helpers shared by the host-call unit tests.

#![cfg(test)]

use std::collections::BTreeMap;

use jam_state::{AccumulationContext, DeltaSnapshot};
use jam_types::{AuthorizerQueue, Privileges, ServiceAccount, ServiceId, TimeInfo, ValidatorKeys};

pub fn account(balance: u64) -> ServiceAccount {
    let mut a = ServiceAccount::new([0u8; 32], 0, 0);
    a.balance = balance;
    a
}

pub fn context_with(accounts: Vec<(ServiceId, ServiceAccount)>, privileges: Privileges) -> AccumulationContext {
    let map: BTreeMap<ServiceId, ServiceAccount> = accounts.into_iter().collect();
    AccumulationContext::new(
        DeltaSnapshot::new(map),
        ValidatorKeys::new(),
        AuthorizerQueue::new(2),
        privileges,
        TimeInfo::new(100),
        [0u8; 32],
    )
}

pub fn simple_context(accounts: Vec<(ServiceId, ServiceAccount)>) -> AccumulationContext {
    context_with(accounts, Privileges::new(2))
}
