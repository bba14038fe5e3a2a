pub mod formatter;

pub use formatter::{
    bar_cells, format_age, format_assessment, format_contribution_chart, format_decision,
    format_record, format_score, format_stored_assessment, format_submission, format_tsv,
    format_value, should_use_colors, signed_bar, truncate_label,
};
