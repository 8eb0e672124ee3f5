// SBDL Contracts - Core Library
// Reshapes account, party relation and party address extracts into
// contract events for the downstream message bus

pub mod envelope;       // Field envelopes (operation + old/new value)
pub mod timestamp;      // Source date parsing, event timestamp format
pub mod records;        // Source record shapes
pub mod contract;       // Accounts → contracts
pub mod party;          // Relations + addresses → party details per account
pub mod assembler;      // Contracts ⟕ party details
pub mod event;          // Event header, keys, payload
pub mod barrier;        // Deferred join/group materialization
pub mod pipeline;       // Stage wiring
pub mod context;        // Execution context
pub mod config;         // Per-environment job configuration
pub mod loader;         // CSV / warehouse readers
pub mod publish;        // Publish key/value preparation and sink

// Re-export commonly used types
pub use envelope::{wrap, FieldEnvelope, Operation};
pub use timestamp::SourceTime;
pub use records::{AccountId, AccountRecord, AddressRecord, PartyId, PartyRelationRecord};
pub use contract::{
    account_to_contract, contract_title_lines,
    ContractRecord, ContractTitleLine, ContractTitleLineType, TaxIdentifier,
};
pub use party::{
    get_party_addresses, get_party_relations, join_party_addresses,
    AccountPartyRelations, PartyAddress, PartyAddressRecord, PartyDetail, PartyRelation,
};
pub use assembler::{join_parties, ContractPartyRecord};
pub use event::{attach_header, ContractEvent, ContractPayload, EventHeader, EventKey};
pub use pipeline::build_contract_events;
pub use context::{ExecutionContext, HeaderTemplate, JobEnv};
pub use config::JobConfig;
pub use loader::DataLoader;
pub use publish::{prepare_publish_records, write_to_sink, PublishRecord};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
