//! Symptom/disease/country triplet counting and the report shapes built
//! from it.

pub mod aggregator;
pub mod report;

pub use aggregator::{
    aggregate_extracted, Aggregation, ExtractedRecord, PipelineResult, SummaryRow,
    TripletAggregator, TripletKey, TrendRow,
};
pub use report::{
    bar_rows, summary_csv_string, symptom_country_matrix, top_rows, write_summary_csv,
    yearly_mentions, BarRow, Heatmap, Report, ReportConfig, YearlyMentions, CSV_FILE_NAME,
};
