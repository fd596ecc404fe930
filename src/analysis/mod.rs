pub mod report;
pub use report::AnalysisReport;
pub use report::Comparison;
