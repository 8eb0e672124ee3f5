// 📂 Data Loader - reads the three source record sets
//
// Two sources, picked by config:
//   - CSV extracts (accounts.csv, parties.csv, party_address.csv) under data.dir
//   - tables accounts, parties, party_address in the SQLite warehouse
//
// Loading is the only place the job touches storage; the pipeline itself
// only sees typed record collections. Key columns are nullable in both
// sources and load as None.

use crate::config::JobConfig;
use crate::records::{AccountRecord, AddressRecord, PartyRelationRecord};
use crate::timestamp::{parse_source_date, SourceTime};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, OpenFlags, Row};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

pub const ACCOUNTS_TABLE: &str = "accounts";
pub const PARTIES_TABLE: &str = "parties";
pub const ADDRESSES_TABLE: &str = "party_address";

// ============================================================================
// CSV SOURCE
// ============================================================================

/// Deserialize every row of a headed CSV stream
pub fn read_csv<T, R>(reader: R) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (idx, result) in rdr.deserialize().enumerate() {
        // +2: header line plus 1-based numbering
        let record: T = result.with_context(|| format!("Failed to deserialize CSV line {}", idx + 2))?;
        records.push(record);
    }

    Ok(records)
}

fn read_csv_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    read_csv(file).with_context(|| format!("Failed to load {:?}", path))
}

// ============================================================================
// WAREHOUSE SOURCE
// ============================================================================

fn optional_date(raw: Option<String>) -> Result<Option<NaiveDate>> {
    match raw {
        Some(value) if !value.trim().is_empty() => Ok(Some(parse_source_date(&value)?)),
        _ => Ok(None),
    }
}

fn time_column(raw: &str, column: &str) -> Result<SourceTime> {
    SourceTime::parse(raw).with_context(|| format!("Bad value in column {}", column))
}

fn query_rows<T, F>(conn: &Connection, sql: &str, map: F) -> Result<Vec<T>>
where
    F: Fn(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn
        .prepare(sql)
        .with_context(|| format!("Failed to prepare query: {}", sql))?;
    let rows = stmt
        .query_map([], map)?
        .collect::<rusqlite::Result<Vec<T>>>()
        .with_context(|| format!("Failed to read rows for: {}", sql))?;
    Ok(rows)
}

pub fn read_accounts_db(conn: &Connection) -> Result<Vec<AccountRecord>> {
    let sql = format!(
        "SELECT load_date, active_ind, account_id, source_sys, account_start_date,
                legal_title_1, legal_title_2, tax_id_type, tax_id, branch_code, country
         FROM {}",
        ACCOUNTS_TABLE
    );

    let raw = query_rows(conn, &sql, |row| {
        Ok((
            row.get::<_, Option<String>>("load_date")?,
            row.get::<_, Option<i32>>("active_ind")?,
            row.get::<_, Option<String>>("account_id")?,
            row.get::<_, String>("source_sys")?,
            row.get::<_, String>("account_start_date")?,
            row.get::<_, Option<String>>("legal_title_1")?,
            row.get::<_, Option<String>>("legal_title_2")?,
            row.get::<_, String>("tax_id_type")?,
            row.get::<_, String>("tax_id")?,
            row.get::<_, String>("branch_code")?,
            row.get::<_, String>("country")?,
        ))
    })?;

    raw.into_iter()
        .map(
            |(load_date, active_ind, account_id, source_sys, start, title_1, title_2, tax_id_type, tax_id, branch_code, country)| {
                Ok(AccountRecord {
                    load_date: optional_date(load_date)?,
                    active_ind,
                    account_id,
                    source_sys,
                    account_start_date: time_column(&start, "account_start_date")?,
                    legal_title_1: title_1,
                    legal_title_2: title_2,
                    tax_id_type,
                    tax_id,
                    branch_code,
                    country,
                })
            },
        )
        .collect()
}

pub fn read_parties_db(conn: &Connection) -> Result<Vec<PartyRelationRecord>> {
    let sql = format!(
        "SELECT load_date, account_id, party_id, relation_type, relation_start_date FROM {}",
        PARTIES_TABLE
    );

    let raw = query_rows(conn, &sql, |row| {
        Ok((
            row.get::<_, Option<String>>("load_date")?,
            row.get::<_, Option<String>>("account_id")?,
            row.get::<_, Option<String>>("party_id")?,
            row.get::<_, String>("relation_type")?,
            row.get::<_, String>("relation_start_date")?,
        ))
    })?;

    raw.into_iter()
        .map(|(load_date, account_id, party_id, relation_type, start)| {
            Ok(PartyRelationRecord {
                load_date: optional_date(load_date)?,
                account_id,
                party_id,
                relation_type,
                relation_start_date: time_column(&start, "relation_start_date")?,
            })
        })
        .collect()
}

pub fn read_addresses_db(conn: &Connection) -> Result<Vec<AddressRecord>> {
    let sql = format!(
        "SELECT load_date, party_id, address_line_1, address_line_2, city, postal_code,
                country_of_address, address_start_date
         FROM {}",
        ADDRESSES_TABLE
    );

    let raw = query_rows(conn, &sql, |row| {
        Ok((
            row.get::<_, Option<String>>("load_date")?,
            row.get::<_, Option<String>>("party_id")?,
            row.get::<_, String>("address_line_1")?,
            row.get::<_, Option<String>>("address_line_2")?,
            row.get::<_, String>("city")?,
            row.get::<_, String>("postal_code")?,
            row.get::<_, String>("country_of_address")?,
            row.get::<_, String>("address_start_date")?,
        ))
    })?;

    raw.into_iter()
        .map(|(load_date, party_id, line_1, line_2, city, postal_code, country, start)| {
            Ok(AddressRecord {
                load_date: optional_date(load_date)?,
                party_id,
                address_line_1: line_1,
                address_line_2: line_2,
                city,
                postal_code,
                country_of_address: country,
                address_start_date: time_column(&start, "address_start_date")?,
            })
        })
        .collect()
}

// ============================================================================
// DATA LOADER
// ============================================================================

enum Source {
    Csv(std::path::PathBuf),
    Warehouse(Connection),
}

/// Reads source record sets according to the job configuration
pub struct DataLoader {
    source: Source,
    active_accounts_only: bool,
}

impl DataLoader {
    pub fn from_config(config: &JobConfig) -> Result<Self> {
        let source = if config.enable_hive {
            let conn = Connection::open_with_flags(&config.hive_database, OpenFlags::SQLITE_OPEN_READ_ONLY)
                .with_context(|| format!("Failed to open warehouse: {:?}", config.hive_database))?;
            info!(database = ?config.hive_database, "Reading from warehouse");
            Source::Warehouse(conn)
        } else {
            info!(dir = ?config.data_dir, "Reading from CSV extracts");
            Source::Csv(config.data_dir.clone())
        };

        Ok(DataLoader {
            source,
            active_accounts_only: config.active_accounts_only,
        })
    }

    /// Loader over an already open warehouse connection
    pub fn from_connection(conn: Connection, active_accounts_only: bool) -> Self {
        DataLoader {
            source: Source::Warehouse(conn),
            active_accounts_only,
        }
    }

    pub fn read_accounts(&self) -> Result<Vec<AccountRecord>> {
        let accounts: Vec<AccountRecord> = match &self.source {
            Source::Csv(dir) => read_csv_file(&dir.join("accounts.csv"))?,
            Source::Warehouse(conn) => read_accounts_db(conn)?,
        };

        let total = accounts.len();
        let accounts = filter_accounts(accounts, self.active_accounts_only);
        debug!(total, kept = accounts.len(), "Loaded accounts");
        Ok(accounts)
    }

    pub fn read_parties(&self) -> Result<Vec<PartyRelationRecord>> {
        let parties = match &self.source {
            Source::Csv(dir) => read_csv_file(&dir.join("parties.csv"))?,
            Source::Warehouse(conn) => read_parties_db(conn)?,
        };
        debug!(count = parties.len(), "Loaded party relations");
        Ok(parties)
    }

    pub fn read_addresses(&self) -> Result<Vec<AddressRecord>> {
        let addresses = match &self.source {
            Source::Csv(dir) => read_csv_file(&dir.join("party_address.csv"))?,
            Source::Warehouse(conn) => read_addresses_db(conn)?,
        };
        debug!(count = addresses.len(), "Loaded party addresses");
        Ok(addresses)
    }
}

/// Runtime account filter (account.filter.active_only)
pub fn filter_accounts(accounts: Vec<AccountRecord>, active_only: bool) -> Vec<AccountRecord> {
    if !active_only {
        return accounts;
    }
    accounts.into_iter().filter(AccountRecord::is_active).collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNTS_CSV: &str = "\
load_date,active_ind,account_id,source_sys,account_start_date,legal_title_1,legal_title_2,tax_id_type,tax_id,branch_code,country
2022-08-02,1,6982391060,COH,2018-03-24T13:56:45.000+05:30,Tiffany Riley,Matthew Davies,EIN,ZLCK91795330413525,ACXMGBA5,Mexico
2022-08-02,1,6982391061,ADS,2018-07-19T11:24:49.000+05:30,Garcia and Sons,,SSP,CADM72996313719955,SHJFGBML,United States
2022-08-02,0,6982391062,BDL,2018-08-29T17:18:54.000+05:30,,,CPR,UJLN20870916319425,WZTEGBTG,Canada
";

    const PARTIES_CSV: &str = "\
load_date,account_id,party_id,relation_type,relation_start_date
2022-08-02,6982391060,9823462810,F-N,2019-07-29T06:21:32.000+05:30
2022-08-02,6982391061,9823462811,F-N,2018-08-31T05:27:22.000+05:30
2022-08-02,6982391061,9823462812,F-S,2018-08-25T15:50:29.000+05:30
";

    const ADDRESSES_CSV: &str = "\
load_date,party_id,address_line_1,address_line_2,city,postal_code,country_of_address,address_start_date
2022-08-02,9823462810,45229 Drake Route,13306 Corey Point,Shanefort,77163,Canada,2019-02-26
2022-08-02,9823462811,361 Robinson Green,,Kellyburgh,40134,United States,2018-01-28
";

    #[test]
    fn test_read_accounts_csv_optional_titles() {
        let accounts: Vec<AccountRecord> = read_csv(ACCOUNTS_CSV.as_bytes()).unwrap();

        assert_eq!(accounts.len(), 3);
        assert_eq!(accounts[0].account_id.as_deref(), Some("6982391060"));
        assert_eq!(accounts[0].legal_title_2.as_deref(), Some("Matthew Davies"));
        assert!(accounts[1].legal_title_2.is_none());
        assert!(accounts[2].legal_title_1.is_none());
        assert_eq!(accounts[0].load_date, NaiveDate::from_ymd_opt(2022, 8, 2));
    }

    #[test]
    fn test_active_filter() {
        let accounts: Vec<AccountRecord> = read_csv(ACCOUNTS_CSV.as_bytes()).unwrap();

        assert_eq!(filter_accounts(accounts.clone(), false).len(), 3);
        let active = filter_accounts(accounts, true);
        assert_eq!(active.len(), 2);
        assert!(active
            .iter()
            .all(|a| a.account_id.as_deref() != Some("6982391062")));
    }

    #[test]
    fn test_read_parties_and_addresses_csv() {
        let parties: Vec<PartyRelationRecord> = read_csv(PARTIES_CSV.as_bytes()).unwrap();
        let addresses: Vec<AddressRecord> = read_csv(ADDRESSES_CSV.as_bytes()).unwrap();

        assert_eq!(parties.len(), 3);
        assert_eq!(parties[2].relation_type, "F-S");
        assert_eq!(addresses.len(), 2);
        assert!(addresses[1].address_line_2.is_none());
        assert_eq!(addresses[0].city, "Shanefort");
        assert!(addresses[0].address_start_date.is_date_only());
        assert_eq!(addresses[0].address_start_date.to_string(), "2019-02-26");
        assert!(!parties[0].relation_start_date.is_date_only());
    }

    #[test]
    fn test_empty_csv_keys_load_as_none() {
        let parties_csv = "\
account_id,party_id,relation_type,relation_start_date
,,F-N,2019-07-29
6982391060,,F-S,2019-07-29
";
        let addresses_csv = "\
party_id,address_line_1,address_line_2,city,postal_code,country_of_address,address_start_date
,45229 Drake Route,,Shanefort,77163,Canada,2019-02-26
";
        let parties: Vec<PartyRelationRecord> = read_csv(parties_csv.as_bytes()).unwrap();
        let addresses: Vec<AddressRecord> = read_csv(addresses_csv.as_bytes()).unwrap();

        assert!(parties[0].account_id.is_none());
        assert!(parties[0].party_id.is_none());
        assert_eq!(parties[1].account_id.as_deref(), Some("6982391060"));
        assert!(parties[1].party_id.is_none());
        assert!(addresses[0].party_id.is_none());
    }

    #[test]
    fn test_bad_timestamp_reports_line() {
        let csv = "account_id,party_id,relation_type,relation_start_date\n1,10,OWNER,yesterday\n";
        let err = read_csv::<PartyRelationRecord, _>(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    fn warehouse() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE accounts (
                load_date TEXT, active_ind INTEGER, account_id TEXT,
                source_sys TEXT, account_start_date TEXT, legal_title_1 TEXT,
                legal_title_2 TEXT, tax_id_type TEXT, tax_id TEXT,
                branch_code TEXT, country TEXT
             );
             CREATE TABLE parties (
                load_date TEXT, account_id TEXT, party_id TEXT,
                relation_type TEXT, relation_start_date TEXT
             );
             CREATE TABLE party_address (
                load_date TEXT, party_id TEXT, address_line_1 TEXT, address_line_2 TEXT,
                city TEXT, postal_code TEXT, country_of_address TEXT, address_start_date TEXT
             );
             INSERT INTO accounts VALUES
                ('2022-08-02', 1, '1', 'CORE', '2020-01-01', 'ACME', NULL, 'EIN', '99-1', '001', 'US'),
                ('2022-08-02', 0, '2', 'CORE', '2020-01-01', NULL, NULL, 'EIN', '99-2', '001', 'US');
             INSERT INTO parties VALUES ('2022-08-02', '1', '10', 'OWNER', '2020-01-01');
             INSERT INTO party_address VALUES
                ('2022-08-02', '10', '1 Main St', NULL, 'NYC', '10001', 'US', '2020-01-01');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_warehouse_loader() {
        let loader = DataLoader::from_connection(warehouse(), true);

        let accounts = loader.read_accounts().unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].legal_title_1.as_deref(), Some("ACME"));
        assert!(accounts[0].legal_title_2.is_none());

        let parties = loader.read_parties().unwrap();
        assert_eq!(parties.len(), 1);
        assert_eq!(parties[0].party_id.as_deref(), Some("10"));

        let addresses = loader.read_addresses().unwrap();
        assert_eq!(addresses.len(), 1);
        assert_eq!(addresses[0].city, "NYC");
        assert!(addresses[0].address_line_2.is_none());
    }

    #[test]
    fn test_warehouse_without_filter_keeps_inactive() {
        let accounts = DataLoader::from_connection(warehouse(), false)
            .read_accounts()
            .unwrap();
        assert_eq!(accounts.len(), 2);
    }

    #[test]
    fn test_warehouse_null_keys_load() {
        let conn = warehouse();
        conn.execute_batch(
            "INSERT INTO parties VALUES ('2022-08-02', '1', NULL, 'GUARANTOR', '2020-01-01');
             INSERT INTO parties VALUES ('2022-08-02', NULL, '11', 'OWNER', '2020-01-01');
             INSERT INTO party_address VALUES
                ('2022-08-02', NULL, '9 Side St', NULL, 'LA', '90001', 'US', '2019-02-26');",
        )
        .unwrap();
        let loader = DataLoader::from_connection(conn, false);

        let parties = loader.read_parties().unwrap();
        assert_eq!(parties.len(), 3);
        assert!(parties[1].party_id.is_none());
        assert_eq!(parties[1].account_id.as_deref(), Some("1"));
        assert!(parties[2].account_id.is_none());

        let addresses = loader.read_addresses().unwrap();
        assert_eq!(addresses.len(), 2);
        assert!(addresses[1].party_id.is_none());
        assert_eq!(addresses[1].address_start_date.to_string(), "2019-02-26");
    }
}
