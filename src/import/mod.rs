mod csv_import;
mod ledger_json;

pub(crate) use csv_import::{parse_decimal, CsvImporter, CsvProfile};
pub(crate) use ledger_json::{merge_ledger, read_ledger_file, write_ledger_file};
