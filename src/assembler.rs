// 🧩 Contract Assembly - contracts ⟕ per-account party relations
//
// Left join on account_id: every contract survives, the aggregated party
// details are merged in when the account has any. The right side's
// account_id is dropped; the contract keeps its own. A null account_id on
// either side never matches.

use crate::barrier::barrier;
use crate::contract::ContractRecord;
use crate::party::{AccountPartyRelations, PartyDetail};
use crate::records::AccountId;
use std::collections::HashMap;

/// Contract with its party details attached
#[derive(Debug, Clone, PartialEq)]
pub struct ContractPartyRecord {
    pub contract: ContractRecord,
    /// None when the account has no party relations at all. Not an empty
    /// list: contractTitle uses [] for "nothing" while this uses null, and
    /// consumers already depend on both.
    pub party_relations: Option<Vec<PartyDetail>>,
}

impl ContractPartyRecord {
    pub fn account_id(&self) -> Option<&str> {
        self.contract.account_id.as_deref()
    }
}

/// Left join aggregated party relations onto contracts by account_id
pub fn join_parties<C, P>(contracts: C, parties: P) -> impl Iterator<Item = ContractPartyRecord>
where
    C: IntoIterator<Item = ContractRecord>,
    P: IntoIterator<Item = AccountPartyRelations>,
{
    barrier(move || {
        // Aggregated rows are unique per account, so the build side never fans out
        let mut relations_by_account: HashMap<AccountId, Vec<PartyDetail>> = HashMap::new();
        for row in parties {
            if let Some(account_id) = row.account_id {
                relations_by_account
                    .entry(account_id)
                    .or_default()
                    .extend(row.party_relations);
            }
        }

        contracts.into_iter().map(move |contract| {
            let party_relations = contract
                .account_id
                .as_ref()
                .and_then(|account_id| relations_by_account.get(account_id))
                .cloned();
            ContractPartyRecord {
                contract,
                party_relations,
            }
        })
    })
}

// ============================================================================
// TESTS
// ============================================================================
