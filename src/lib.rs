// Library interface for LiftLog modules
// This allows integration tests to access the core functionality

pub mod analytics;
pub mod charts;
pub mod config;
pub mod database;
pub mod error;
pub mod goals;
pub mod locale;
pub mod logging;
pub mod models;
pub mod one_rm;
pub mod program_plan;
pub mod recommendations;
pub mod requests;
pub mod validation;

// Re-export commonly used types for convenience
pub use models::*;
pub use analytics::{AnalyticsConfig, AnalyticsEngine, AnalyticsResult};
pub use charts::{ChartBuilder, ChartMetric, ChartSeries};
pub use config::{AppConfig, OutputFormat};
pub use database::{Database, HistoryQuery};
pub use error::{DatabaseError, LiftLogError, Result, ValidationError};
pub use locale::Locale;
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use one_rm::{OneRmCalculator, OneRmFormula, OneRmRequest, OneRmResponse};
pub use program_plan::PlanDayGenerator;
pub use recommendations::{Recommendation, RecommendationRules};
pub use validation::{Pagination, Validate};
