// 📨 Contract Events - outer envelope around each assembled contract
//
// {eventHeader, keys, payload}: the header identifies the event, keys tell
// the bus how to partition it, payload carries the contract itself.

use crate::assembler::ContractPartyRecord;
use crate::context::ExecutionContext;
use crate::contract::{ContractTitleLine, TaxIdentifier};
use crate::envelope::FieldEnvelope;
use crate::party::PartyDetail;
use crate::records::AccountId;
use crate::timestamp::{format_event_date_time, SourceTime};
use serde::{Deserialize, Serialize};

pub const CONTRACT_KEY_FIELD: &str = "contractIdentifier";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventHeader {
    pub event_identifier: String,
    pub event_type: String,
    pub major_schema_version: u32,
    pub minor_schema_version: u32,
    /// yyyy-MM-dd'T'HH:mm:ssZ
    pub event_date_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventKey {
    pub key_field: String,
    pub key_value: Option<AccountId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractPayload {
    pub contract_identifier: FieldEnvelope<Option<AccountId>>,
    pub source_system_identifier: FieldEnvelope<String>,
    pub contact_start_date_time: FieldEnvelope<SourceTime>,
    pub contract_title: FieldEnvelope<Vec<ContractTitleLine>>,
    pub tax_identifier: FieldEnvelope<TaxIdentifier>,
    pub contract_branch_code: FieldEnvelope<String>,
    pub contract_country: FieldEnvelope<String>,
    pub party_relations: Option<Vec<PartyDetail>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractEvent {
    pub event_header: EventHeader,
    pub keys: Vec<EventKey>,
    pub payload: ContractPayload,
}

impl ContractEvent {
    /// Build the event for one assembled record
    ///
    /// Draws a fresh identifier and the current processing time from the
    /// context, so two calls never produce equal headers.
    pub fn from_record(ctx: &ExecutionContext, record: ContractPartyRecord) -> Self {
        let ContractPartyRecord {
            contract,
            party_relations,
        } = record;

        let event_header = EventHeader {
            event_identifier: ctx.next_event_identifier(),
            event_type: ctx.header.event_type.clone(),
            major_schema_version: ctx.header.major_schema_version,
            minor_schema_version: ctx.header.minor_schema_version,
            event_date_time: format_event_date_time(ctx.now()),
        };

        let keys = vec![EventKey {
            key_field: CONTRACT_KEY_FIELD.to_string(),
            key_value: contract.account_id,
        }];

        let payload = ContractPayload {
            contract_identifier: contract.contract_identifier,
            source_system_identifier: contract.source_system_identifier,
            contact_start_date_time: contract.contact_start_date_time,
            contract_title: contract.contract_title,
            tax_identifier: contract.tax_identifier,
            contract_branch_code: contract.contract_branch_code,
            contract_country: contract.contract_country,
            party_relations,
        };

        ContractEvent {
            event_header,
            keys,
            payload,
        }
    }

    /// Publish key: payload.contractIdentifier.newValue, None when null
    pub fn publish_key(&self) -> Option<&str> {
        self.payload.contract_identifier.new_value.as_deref()
    }
}

/// Wrap every assembled record in its event envelope
///
/// Ids and timestamps are drawn as rows are pulled, not up front.
pub fn attach_header<'a, I>(
    ctx: &'a ExecutionContext,
    records: I,
) -> impl Iterator<Item = ContractEvent> + 'a
where
    I: IntoIterator<Item = ContractPartyRecord>,
    I::IntoIter: 'a,
{
    records
        .into_iter()
        .map(move |record| ContractEvent::from_record(ctx, record))
}

// ============================================================================
// TESTS
// ============================================================================
