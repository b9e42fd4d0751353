//! Archive table contract.
//!
//! The collection host owns storage: one row per poll cycle, keyed by the
//! record timestamp. This module only states the agreed column set so the
//! host-side table and the records produced here cannot drift apart. Nothing
//! in this crate persists anything.

use crate::record::OBSERVATION_FIELDS;

/// One column of the host's archive table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub sql_type: &'static str,
}

/// The archive table: timestamp key, unit system, archive interval, and the
/// six observation columns.
pub const ARCHIVE_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        name: "dateTime",
        sql_type: "INTEGER NOT NULL UNIQUE PRIMARY KEY",
    },
    ColumnSpec {
        name: "usUnits",
        sql_type: "INTEGER NOT NULL",
    },
    ColumnSpec {
        name: "interval",
        sql_type: "INTEGER NOT NULL",
    },
    ColumnSpec {
        name: "input_voltage",
        sql_type: "REAL",
    },
    ColumnSpec {
        name: "output_voltage",
        sql_type: "REAL",
    },
    ColumnSpec {
        name: "battery_charge",
        sql_type: "REAL",
    },
    ColumnSpec {
        name: "battery_runtime",
        sql_type: "REAL",
    },
    ColumnSpec {
        name: "battery_voltage",
        sql_type: "REAL",
    },
    ColumnSpec {
        name: "ups_load",
        sql_type: "REAL",
    },
];

/// `CREATE TABLE` statement for the archive table, mostly useful for setting
/// up a scratch database in tests or demos.
pub fn create_table_sql(table: &str) -> String {
    let columns: Vec<String> = ARCHIVE_COLUMNS
        .iter()
        .map(|c| format!("`{}` {}", c.name, c.sql_type))
        .collect();
    format!("CREATE TABLE {table} ({})", columns.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_observation_field_has_a_column() {
        for key in OBSERVATION_FIELDS {
            let column = key.replace('.', "_");
            assert!(
                ARCHIVE_COLUMNS.iter().any(|c| c.name == column),
                "missing column for {key}"
            );
        }
    }

    #[test]
    fn every_real_column_is_an_observation_field() {
        for column in ARCHIVE_COLUMNS.iter().filter(|c| c.sql_type == "REAL") {
            assert!(
                OBSERVATION_FIELDS
                    .iter()
                    .any(|key| key.replace('.', "_") == column.name),
                "column {} has no observation field",
                column.name
            );
        }
    }

    #[test]
    fn timestamp_is_the_primary_key() {
        let date_time = ARCHIVE_COLUMNS.first().unwrap();
        assert_eq!(date_time.name, "dateTime");
        assert!(date_time.sql_type.contains("PRIMARY KEY"));
    }

    #[test]
    fn create_table_sql_lists_all_columns() {
        let sql = create_table_sql("archive");
        assert!(sql.starts_with("CREATE TABLE archive ("));
        for column in ARCHIVE_COLUMNS {
            assert!(sql.contains(column.name));
        }
    }
}
