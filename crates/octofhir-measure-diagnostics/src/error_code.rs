//! Measure error codes following a structured numbering system
//!
//! Error code ranges:
//! - MQ0001-MQ0099: Schema errors (input tables, required columns)
//! - MQ0100-MQ0199: Configuration errors (measure specs, registry)
//! - MQ0200-MQ0299: Evaluation errors (run level)
//! - MQ0300-MQ0399: Data-quality issues (individual records, never fatal)
//! - MQ0400-MQ0499: System errors (I/O)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Check if this is a schema error (0001-0099)
    pub const fn is_schema_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    /// Check if this is a configuration error (0100-0199)
    pub const fn is_configuration_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is an evaluation error (0200-0299)
    pub const fn is_evaluation_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Check if this is a data-quality issue (0300-0399)
    pub const fn is_data_quality(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    /// Check if this is a system error (0400-0499)
    pub const fn is_system_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MQ{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

use std::collections::HashMap;
use std::sync::LazyLock;

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Schema errors (0001-0099)
    map.insert(1, ErrorInfo::new("Required column missing")
        .with_help("Every input table must carry the columns the engine reads"));
    map.insert(2, ErrorInfo::new("Malformed input table"));
    map.insert(3, ErrorInfo::new("Row width does not match column count"));
    map.insert(4, ErrorInfo::new("Record is not an object"));

    // Configuration errors (0100-0199)
    map.insert(100, ErrorInfo::new("Unknown measure")
        .with_help("List the registry contents to see the available measure ids"));
    map.insert(101, ErrorInfo::new("Invalid age range"));
    map.insert(102, ErrorInfo::new("Measure has no modalities"));
    map.insert(103, ErrorInfo::new("Duplicate modality id"));
    map.insert(104, ErrorInfo::new("Invalid adherence threshold"));
    map.insert(105, ErrorInfo::new("Measure has no eligible genders"));
    map.insert(106, ErrorInfo::new("Invalid medication lexicon"));
    map.insert(107, ErrorInfo::new("Registry load failed"));
    map.insert(108, ErrorInfo::new("Duplicate measure id"));
    map.insert(109, ErrorInfo::new("Invalid measurement year"));
    map.insert(110, ErrorInfo::new("Invalid priority table"));
    map.insert(111, ErrorInfo::new("Evidence source not usable here")
        .with_help("Exclusions are matched against claims; use procedure, diagnosis or claim"));
    map.insert(112, ErrorInfo::new("Pharmacy modality without medication class"));

    // Evaluation errors (0200-0299)
    map.insert(200, ErrorInfo::new("Evaluation failed"));
    map.insert(201, ErrorInfo::new("Invariant violated"));

    // Data-quality issues (0300-0399)
    map.insert(300, ErrorInfo::new("Unparseable date")
        .with_help("The record is kept but never matches a time window"));
    map.insert(301, ErrorInfo::new("Invalid birth date")
        .with_help("The member is excluded from the denominator"));
    map.insert(302, ErrorInfo::new("Invalid days supply")
        .with_help("The fill falls back to the default 30-day supply"));
    map.insert(303, ErrorInfo::new("Invalid enrollment months")
        .with_help("Enrollment is treated as not reported"));
    map.insert(304, ErrorInfo::new("Unknown claim type"));
    map.insert(305, ErrorInfo::new("Unknown gender"));
    map.insert(306, ErrorInfo::new("Record without member id"));
    map.insert(307, ErrorInfo::new("Record for unknown member"));
    map.insert(308, ErrorInfo::new("Duplicate member record"));

    // System errors (0400-0499)
    map.insert(400, ErrorInfo::new("Internal error"));
    map.insert(401, ErrorInfo::new("I/O error"));
    map.insert(402, ErrorInfo::new("Invalid format"));

    map
});

// Schema errors
pub const MQ0001: ErrorCode = ErrorCode::new(1);
pub const MQ0002: ErrorCode = ErrorCode::new(2);
pub const MQ0003: ErrorCode = ErrorCode::new(3);
pub const MQ0004: ErrorCode = ErrorCode::new(4);

// Configuration errors
pub const MQ0100: ErrorCode = ErrorCode::new(100);
pub const MQ0101: ErrorCode = ErrorCode::new(101);
pub const MQ0102: ErrorCode = ErrorCode::new(102);
pub const MQ0103: ErrorCode = ErrorCode::new(103);
pub const MQ0104: ErrorCode = ErrorCode::new(104);
pub const MQ0105: ErrorCode = ErrorCode::new(105);
pub const MQ0106: ErrorCode = ErrorCode::new(106);
pub const MQ0107: ErrorCode = ErrorCode::new(107);
pub const MQ0108: ErrorCode = ErrorCode::new(108);
pub const MQ0109: ErrorCode = ErrorCode::new(109);
pub const MQ0110: ErrorCode = ErrorCode::new(110);
pub const MQ0111: ErrorCode = ErrorCode::new(111);
pub const MQ0112: ErrorCode = ErrorCode::new(112);

// Evaluation errors
pub const MQ0200: ErrorCode = ErrorCode::new(200);
pub const MQ0201: ErrorCode = ErrorCode::new(201);

// Data-quality issues
pub const MQ0300: ErrorCode = ErrorCode::new(300);
pub const MQ0301: ErrorCode = ErrorCode::new(301);
pub const MQ0302: ErrorCode = ErrorCode::new(302);
pub const MQ0303: ErrorCode = ErrorCode::new(303);
pub const MQ0304: ErrorCode = ErrorCode::new(304);
pub const MQ0305: ErrorCode = ErrorCode::new(305);
pub const MQ0306: ErrorCode = ErrorCode::new(306);
pub const MQ0307: ErrorCode = ErrorCode::new(307);
pub const MQ0308: ErrorCode = ErrorCode::new(308);

// System errors
pub const MQ0400: ErrorCode = ErrorCode::new(400);
pub const MQ0401: ErrorCode = ErrorCode::new(401);
pub const MQ0402: ErrorCode = ErrorCode::new(402);
