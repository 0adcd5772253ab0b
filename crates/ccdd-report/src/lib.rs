mod tables;

pub use tables::{
    MAPPING_TABLE_FILE, NTP_TABLE_FILE, OutputTables, PRODUCT_TABLE_FILE, TM_TABLE_FILE,
    UNMATCHED_REPORT_FILE, write_mapping_table, write_ntp_table, write_outputs,
    write_product_table, write_tm_table, write_unmatched_report,
};
