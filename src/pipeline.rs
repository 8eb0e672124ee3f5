// 🔗 Pipeline - accounts, parties, addresses → contract events
//
//   accounts  ──▶ account_to_contract ─────────────────────┐
//   parties   ──▶ get_party_relations ─┐                    ├─▶ join_parties ─▶ attach_header
//   addresses ──▶ get_party_addresses ─┴▶ join_party_addresses ┘
//
// Nothing runs until the returned iterator is pulled. Only attach_header
// reads the execution context; the stages before it are pure.

use crate::assembler::join_parties;
use crate::context::ExecutionContext;
use crate::contract::account_to_contract;
use crate::event::{attach_header, ContractEvent};
use crate::party::{get_party_addresses, get_party_relations, join_party_addresses};
use crate::records::{AccountRecord, AddressRecord, PartyRelationRecord};

pub fn build_contract_events<'a, A, P, D>(
    ctx: &'a ExecutionContext,
    accounts: A,
    parties: P,
    addresses: D,
) -> impl Iterator<Item = ContractEvent> + 'a
where
    A: IntoIterator<Item = AccountRecord> + 'a,
    P: IntoIterator<Item = PartyRelationRecord> + 'a,
    D: IntoIterator<Item = AddressRecord> + 'a,
{
    let contracts = account_to_contract(accounts);
    let party_relations =
        join_party_addresses(get_party_relations(parties), get_party_addresses(addresses));
    attach_header(ctx, join_parties(contracts, party_relations))
}

// ============================================================================
// TESTS
// ============================================================================
