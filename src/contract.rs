// 📜 Contract Mapping - accounts → base contract records
//
// One account becomes one contract. Every published field is wrapped in a
// FieldEnvelope; the raw account_id rides along unwrapped as the join key.
// A null account_id is published as a null contractIdentifier.

use crate::envelope::{wrap, FieldEnvelope};
use crate::records::{AccountId, AccountRecord};
use crate::timestamp::SourceTime;
use serde::{Deserialize, Serialize};

// ============================================================================
// CONTRACT TITLE
// ============================================================================

/// Which legal title column a title line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractTitleLineType {
    #[serde(rename = "lgl_ttl_ln_1")]
    LegalTitleLine1,
    #[serde(rename = "lgl_ttl_ln_2")]
    LegalTitleLine2,
}

impl ContractTitleLineType {
    pub fn code(&self) -> &'static str {
        match self {
            ContractTitleLineType::LegalTitleLine1 => "lgl_ttl_ln_1",
            ContractTitleLineType::LegalTitleLine2 => "lgl_ttl_ln_2",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractTitleLine {
    pub contract_title_line_type: ContractTitleLineType,
    pub contract_title_line: String,
}

impl ContractTitleLine {
    fn from_source(line_type: ContractTitleLineType, title: Option<&str>) -> Option<Self> {
        title.map(|line| ContractTitleLine {
            contract_title_line_type: line_type,
            contract_title_line: line.to_string(),
        })
    }
}

/// Title lines present on the account, line 1 before line 2
///
/// Never absent: an account with no legal titles yields an empty list.
pub fn contract_title_lines(account: &AccountRecord) -> Vec<ContractTitleLine> {
    [
        ContractTitleLine::from_source(
            ContractTitleLineType::LegalTitleLine1,
            account.legal_title_1.as_deref(),
        ),
        ContractTitleLine::from_source(
            ContractTitleLineType::LegalTitleLine2,
            account.legal_title_2.as_deref(),
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}

// ============================================================================
// TAX IDENTIFIER
// ============================================================================

/// Published as a single envelope; sub-fields are not wrapped individually
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxIdentifier {
    pub tax_id_type: String,
    pub tax_id: String,
}

// ============================================================================
// CONTRACT RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRecord {
    /// Join key, not published in the payload
    #[serde(skip)]
    pub account_id: Option<AccountId>,

    pub contract_identifier: FieldEnvelope<Option<AccountId>>,
    pub source_system_identifier: FieldEnvelope<String>,
    pub contact_start_date_time: FieldEnvelope<SourceTime>,
    pub contract_title: FieldEnvelope<Vec<ContractTitleLine>>,
    pub tax_identifier: FieldEnvelope<TaxIdentifier>,
    pub contract_branch_code: FieldEnvelope<String>,
    pub contract_country: FieldEnvelope<String>,
}

impl ContractRecord {
    pub fn from_account(account: &AccountRecord) -> Self {
        ContractRecord {
            account_id: account.account_id.clone(),
            contract_identifier: wrap(account.account_id.clone()),
            source_system_identifier: wrap(account.source_sys.clone()),
            contact_start_date_time: wrap(account.account_start_date),
            contract_title: wrap(contract_title_lines(account)),
            tax_identifier: wrap(TaxIdentifier {
                tax_id_type: account.tax_id_type.clone(),
                tax_id: account.tax_id.clone(),
            }),
            contract_branch_code: wrap(account.branch_code.clone()),
            contract_country: wrap(account.country.clone()),
        }
    }
}

/// Map every account to its base contract record
pub fn account_to_contract<I>(accounts: I) -> impl Iterator<Item = ContractRecord>
where
    I: IntoIterator<Item = AccountRecord>,
{
    accounts
        .into_iter()
        .map(|account| ContractRecord::from_account(&account))
}

// ============================================================================
// TESTS
// ============================================================================
