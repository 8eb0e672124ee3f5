// 📥 Source Records - the three flat batch extracts
//
// Accounts, party relations and party addresses are linked relationally:
//   accounts.account_id  ←  parties.account_id   (one-to-many)
//   parties.party_id     ←  party_address.party_id (zero-or-one per party)
//
// Field names follow the source column names so CSV headers and warehouse
// columns deserialize directly. Keys are nullable like every other source
// column; a null key loads as None and is carried through untouched.

use crate::timestamp::SourceTime;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Account key (source column `account_id`)
pub type AccountId = String;

/// Party key (source column `party_id`)
pub type PartyId = String;

// ============================================================================
// ACCOUNTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    #[serde(default, deserialize_with = "crate::timestamp::deserialize_optional_date")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_date: Option<NaiveDate>,

    /// 1 = active; missing means active
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_ind: Option<i32>,

    pub account_id: Option<AccountId>,
    pub source_sys: String,
    pub account_start_date: SourceTime,
    pub legal_title_1: Option<String>,
    pub legal_title_2: Option<String>,
    pub tax_id_type: String,
    pub tax_id: String,
    pub branch_code: String,
    pub country: String,
}

impl AccountRecord {
    pub fn is_active(&self) -> bool {
        self.active_ind.map_or(true, |ind| ind == 1)
    }
}

// ============================================================================
// PARTY RELATIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyRelationRecord {
    #[serde(default, deserialize_with = "crate::timestamp::deserialize_optional_date")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_date: Option<NaiveDate>,

    pub account_id: Option<AccountId>,
    pub party_id: Option<PartyId>,
    pub relation_type: String,
    pub relation_start_date: SourceTime,
}

// ============================================================================
// PARTY ADDRESSES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    #[serde(default, deserialize_with = "crate::timestamp::deserialize_optional_date")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_date: Option<NaiveDate>,

    pub party_id: Option<PartyId>,
    pub address_line_1: String,
    pub address_line_2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country_of_address: String,
    pub address_start_date: SourceTime,
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn ts(raw: &str) -> SourceTime {
        SourceTime::parse(raw).unwrap()
    }

    pub fn account(id: &str, title_1: Option<&str>, title_2: Option<&str>) -> AccountRecord {
        AccountRecord {
            load_date: None,
            active_ind: Some(1),
            account_id: Some(id.to_string()),
            source_sys: "CORE".to_string(),
            account_start_date: ts("2020-01-01"),
            legal_title_1: title_1.map(str::to_string),
            legal_title_2: title_2.map(str::to_string),
            tax_id_type: "EIN".to_string(),
            tax_id: "99-1".to_string(),
            branch_code: "001".to_string(),
            country: "US".to_string(),
        }
    }

    pub fn relation(account_id: &str, party_id: &str, relation_type: &str) -> PartyRelationRecord {
        PartyRelationRecord {
            load_date: None,
            account_id: Some(account_id.to_string()),
            party_id: Some(party_id.to_string()),
            relation_type: relation_type.to_string(),
            relation_start_date: ts("2020-01-01"),
        }
    }

    pub fn address(party_id: &str, city: &str) -> AddressRecord {
        AddressRecord {
            load_date: None,
            party_id: Some(party_id.to_string()),
            address_line_1: "1 Main St".to_string(),
            address_line_2: None,
            city: city.to_string(),
            postal_code: "10001".to_string(),
            country_of_address: "US".to_string(),
            address_start_date: ts("2020-01-01"),
        }
    }
}
