// 👥 Party Relations - relations + addresses → party details per account
//
// Relations and addresses are mapped independently, then stitched:
//   1. left join addresses onto relations by party_id
//   2. group the joined rows by account_id
//
// Both steps are barriers: the address index and the per-account groups
// must be complete before any aggregated row can be emitted.
//
// Null keys never match in the join. Relations with a null account_id still
// land in a group of their own.

use crate::barrier::barrier;
use crate::envelope::{wrap, FieldEnvelope};
use crate::records::{AccountId, AddressRecord, PartyId, PartyRelationRecord};
use crate::timestamp::SourceTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// PARTY RELATION MAPPING
// ============================================================================

/// Party relation with its published fields wrapped
#[derive(Debug, Clone, PartialEq)]
pub struct PartyRelation {
    /// Group key
    pub account_id: Option<AccountId>,
    /// Join key
    pub party_id: Option<PartyId>,

    pub party_identifier: FieldEnvelope<Option<PartyId>>,
    pub party_relationship_type: FieldEnvelope<String>,
    pub party_relation_start_date_time: FieldEnvelope<SourceTime>,
}

impl PartyRelation {
    pub fn from_record(record: &PartyRelationRecord) -> Self {
        PartyRelation {
            account_id: record.account_id.clone(),
            party_id: record.party_id.clone(),
            party_identifier: wrap(record.party_id.clone()),
            party_relationship_type: wrap(record.relation_type.clone()),
            party_relation_start_date_time: wrap(record.relation_start_date),
        }
    }
}

pub fn get_party_relations<I>(parties: I) -> impl Iterator<Item = PartyRelation>
where
    I: IntoIterator<Item = PartyRelationRecord>,
{
    parties
        .into_iter()
        .map(|record| PartyRelation::from_record(&record))
}

// ============================================================================
// ADDRESS MAPPING
// ============================================================================

/// Nested address structure; published inside one partyAddress envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyAddress {
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub address_city: String,
    pub address_postal_code: String,
    pub address_country: String,
    pub address_start_date: SourceTime,
}

/// Address keyed by its owning party
#[derive(Debug, Clone, PartialEq)]
pub struct PartyAddressRecord {
    pub party_id: Option<PartyId>,
    pub party_address: FieldEnvelope<PartyAddress>,
}

impl PartyAddressRecord {
    pub fn from_record(record: &AddressRecord) -> Self {
        PartyAddressRecord {
            party_id: record.party_id.clone(),
            party_address: wrap(PartyAddress {
                address_line1: record.address_line_1.clone(),
                address_line2: record.address_line_2.clone(),
                address_city: record.city.clone(),
                address_postal_code: record.postal_code.clone(),
                address_country: record.country_of_address.clone(),
                address_start_date: record.address_start_date,
            }),
        }
    }
}

pub fn get_party_addresses<I>(addresses: I) -> impl Iterator<Item = PartyAddressRecord>
where
    I: IntoIterator<Item = AddressRecord>,
{
    addresses
        .into_iter()
        .map(|record| PartyAddressRecord::from_record(&record))
}

// ============================================================================
// PARTY DETAIL AGGREGATION
// ============================================================================

/// One party nested under a contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyDetail {
    pub party_identifier: FieldEnvelope<Option<PartyId>>,
    pub party_relationship_type: FieldEnvelope<String>,
    pub party_relation_start_date_time: FieldEnvelope<SourceTime>,
    /// null when the party has no address row
    pub party_address: Option<FieldEnvelope<PartyAddress>>,
}

impl PartyDetail {
    fn from_joined(relation: &PartyRelation, address: Option<&PartyAddressRecord>) -> Self {
        PartyDetail {
            party_identifier: relation.party_identifier.clone(),
            party_relationship_type: relation.party_relationship_type.clone(),
            party_relation_start_date_time: relation.party_relation_start_date_time.clone(),
            party_address: address.map(|a| a.party_address.clone()),
        }
    }
}

/// All party details of one account
#[derive(Debug, Clone, PartialEq)]
pub struct AccountPartyRelations {
    pub account_id: Option<AccountId>,
    pub party_relations: Vec<PartyDetail>,
}

/// Left join addresses onto relations, then group by account
///
/// Every relation is kept. A relation without an address gets
/// `party_address: None`; a party with several address rows fans out into
/// one detail per address. One output row per distinct account_id in the
/// relation input, in order of first appearance; all null-account relations
/// share one group. Addresses with a null party_id are never indexed and a
/// relation with a null party_id never finds an address. Nothing is indexed
/// until the first row is pulled.
pub fn join_party_addresses<P, A>(parties: P, addresses: A) -> impl Iterator<Item = AccountPartyRelations>
where
    P: IntoIterator<Item = PartyRelation>,
    A: IntoIterator<Item = PartyAddressRecord>,
{
    barrier(move || {
        let mut addresses_by_party: HashMap<PartyId, Vec<PartyAddressRecord>> = HashMap::new();
        for address in addresses {
            if let Some(party_id) = address.party_id.clone() {
                addresses_by_party.entry(party_id).or_default().push(address);
            }
        }

        let mut groups: Vec<AccountPartyRelations> = Vec::new();
        let mut group_index: HashMap<Option<AccountId>, usize> = HashMap::new();

        for relation in parties {
            let matched = relation
                .party_id
                .as_ref()
                .and_then(|party_id| addresses_by_party.get(party_id));

            let details: Vec<PartyDetail> = match matched {
                Some(matches) => matches
                    .iter()
                    .map(|address| PartyDetail::from_joined(&relation, Some(address)))
                    .collect(),
                None => vec![PartyDetail::from_joined(&relation, None)],
            };

            let idx = *group_index
                .entry(relation.account_id.clone())
                .or_insert_with(|| {
                    groups.push(AccountPartyRelations {
                        account_id: relation.account_id.clone(),
                        party_relations: Vec::new(),
                    });
                    groups.len() - 1
                });
            groups[idx].party_relations.extend(details);
        }

        groups.into_iter()
    })
}

// ============================================================================
// TESTS
// ============================================================================
