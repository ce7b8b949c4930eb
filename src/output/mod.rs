pub mod export;
pub mod formatter;

pub use export::{
    build_row, build_rows, default_export_path, render_csv, render_json, write_export, Cell,
    Column, ExportRow,
};
pub use formatter::{
    format_factor_table, format_score, format_scored_table, format_stock_detail, format_tsv,
    should_use_colors,
};
