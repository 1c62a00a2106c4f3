//! Per-member datasets
//!
//! A [`Dataset`] holds every member's demographic record together with the
//! member's own claims, fills and labs. Member evaluation only ever reads one
//! [`MemberRecords`] slice, which is what makes it safe to partition across
//! threads.
//!
//! Ingestion never fails on individual records. Unparseable dates, supplies,
//! enrollment counts and orphan records are degraded and reported as
//! warnings in [`Dataset::diagnostics`]. Only schema problems (absent
//! required columns, malformed tables) are returned as errors.

use crate::date::parse_date;
use crate::record::{ClaimEvent, ClaimType, Gender, LabResult, Member, PharmacyFill};
use crate::table::{Row, Table};
use crate::code::normalize_code;
use log::{debug, warn};
use octofhir_measure_diagnostics::{
    Diagnostic, ErrorCode, MQ0002, MQ0300, MQ0301, MQ0302, MQ0303, MQ0304, MQ0305, MQ0306,
    MQ0307, MQ0308, MQ0401, MeasureError, RecordRef, Result, TableKind,
};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Required columns of the members table
pub const MEMBER_COLUMNS: &[&str] = &["member_id", "birth_date", "gender"];
/// Required columns of the claims table
pub const CLAIM_COLUMNS: &[&str] = &[
    "member_id",
    "diagnosis_code",
    "procedure_code",
    "service_date",
    "claim_type",
];
/// Required columns of the pharmacy table
pub const PHARMACY_COLUMNS: &[&str] = &["member_id", "medication_name", "fill_date"];
/// Required columns of the labs table
pub const LAB_COLUMNS: &[&str] = &["member_id", "test_date", "test_code"];

/// One member's slice of the input
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRecords {
    pub member: Member,
    pub claims: Vec<ClaimEvent>,
    pub fills: Vec<PharmacyFill>,
    pub labs: Vec<LabResult>,
}

impl MemberRecords {
    pub fn new(member: Member) -> Self {
        Self {
            member,
            claims: Vec::new(),
            fills: Vec::new(),
            labs: Vec::new(),
        }
    }

    pub fn member_id(&self) -> &str {
        &self.member.member_id
    }
}

/// Input snapshot partitioned per member, in member-table order
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<MemberRecords>,
    positions: HashMap<String, usize>,
    diagnostics: Vec<Diagnostic>,
}

impl Dataset {
    /// Build from the four input tables
    ///
    /// Required columns are checked on every table before any row is read.
    pub fn from_tables(members: &Table, claims: &Table, pharmacy: &Table, labs: &Table) -> Result<Self> {
        let checks = [
            members.require(MEMBER_COLUMNS),
            claims.require(CLAIM_COLUMNS),
            pharmacy.require(PHARMACY_COLUMNS),
            labs.require(LAB_COLUMNS),
        ];
        let mut errors: Vec<MeasureError> = checks.into_iter().filter_map(|r| r.err()).collect();
        match errors.len() {
            0 => {}
            1 => return Err(errors.remove(0)),
            _ => return Err(MeasureError::Multiple(errors)),
        }

        let mut ingest = Ingest::default();
        let member_rows: Vec<(usize, Member)> =
            members.iter().filter_map(|row| ingest.member(row).map(|m| (row.index(), m))).collect();
        let claim_rows: Vec<(usize, ClaimEvent)> =
            claims.iter().filter_map(|row| ingest.claim(row).map(|c| (row.index(), c))).collect();
        let fill_rows: Vec<(usize, PharmacyFill)> =
            pharmacy.iter().filter_map(|row| ingest.fill(row).map(|f| (row.index(), f))).collect();
        let lab_rows: Vec<(usize, LabResult)> =
            labs.iter().filter_map(|row| ingest.lab(row).map(|l| (row.index(), l))).collect();

        Ok(Self::partition(member_rows, claim_rows, fill_rows, lab_rows, ingest.diagnostics))
    }

    /// Build from a JSON document with `members`, `claims`, `pharmacy` and `labs` tables
    ///
    /// Only `members` is mandatory; absent tables are treated as empty.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| MeasureError::schema(MQ0002, format!("invalid dataset JSON: {}", e)))?;
        let object = value
            .as_object()
            .ok_or_else(|| MeasureError::schema(MQ0002, "dataset must be a JSON object"))?;

        let members = object
            .get("members")
            .ok_or_else(|| MeasureError::schema_in(MQ0002, "members", "dataset has no members table"))?;

        let table = |kind: TableKind| -> Result<Table> {
            match object.get(kind.name()) {
                Some(value) => Table::from_json_value(kind, value),
                None => Ok(Table::empty(kind)),
            }
        };

        Self::from_tables(
            &Table::from_json_value(TableKind::Members, members)?,
            &table(TableKind::Claims)?,
            &table(TableKind::Pharmacy)?,
            &table(TableKind::Labs)?,
        )
    }

    /// Load a JSON dataset from disk
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            MeasureError::system(MQ0401, format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Build from already-typed records
    pub fn from_records(
        members: Vec<Member>,
        claims: Vec<ClaimEvent>,
        fills: Vec<PharmacyFill>,
        labs: Vec<LabResult>,
    ) -> Self {
        Self::partition(
            members.into_iter().enumerate().collect(),
            claims.into_iter().enumerate().collect(),
            fills.into_iter().enumerate().collect(),
            labs.into_iter().enumerate().collect(),
            Vec::new(),
        )
    }

    fn partition(
        members: Vec<(usize, Member)>,
        claims: Vec<(usize, ClaimEvent)>,
        fills: Vec<(usize, PharmacyFill)>,
        labs: Vec<(usize, LabResult)>,
        mut diagnostics: Vec<Diagnostic>,
    ) -> Self {
        let mut records: Vec<MemberRecords> = Vec::with_capacity(members.len());
        let mut positions: HashMap<String, usize> = HashMap::with_capacity(members.len());

        for (row, member) in members {
            if positions.contains_key(&member.member_id) {
                diagnostics.push(data_issue(
                    MQ0308,
                    RecordRef::new(TableKind::Members, row).member(&member.member_id),
                    format!("duplicate member '{}', first record kept", member.member_id),
                ));
                continue;
            }
            positions.insert(member.member_id.clone(), records.len());
            records.push(MemberRecords::new(member));
        }

        let mut attach = |table: TableKind, row: usize, member_id: &str| -> Option<usize> {
            let position = positions.get(member_id).copied();
            if position.is_none() {
                diagnostics.push(data_issue(
                    MQ0307,
                    RecordRef::new(table, row).member(member_id),
                    format!("{} record for unknown member '{}' ignored", table, member_id),
                ));
            }
            position
        };

        for (row, claim) in claims {
            if let Some(at) = attach(TableKind::Claims, row, &claim.member_id) {
                records[at].claims.push(claim);
            }
        }
        for (row, fill) in fills {
            if let Some(at) = attach(TableKind::Pharmacy, row, &fill.member_id) {
                records[at].fills.push(fill);
            }
        }
        for (row, lab) in labs {
            if let Some(at) = attach(TableKind::Labs, row, &lab.member_id) {
                records[at].labs.push(lab);
            }
        }

        debug!(
            "Partitioned dataset: {} members, {} data-quality issues",
            records.len(),
            diagnostics.len()
        );

        Self {
            records,
            positions,
            diagnostics,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All member slices in member-table order
    pub fn records(&self) -> &[MemberRecords] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemberRecords> {
        self.records.iter()
    }

    /// Look up one member's slice
    pub fn get(&self, member_id: &str) -> Option<&MemberRecords> {
        self.positions.get(member_id).map(|&at| &self.records[at])
    }

    /// Data-quality issues found during ingestion
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

fn data_issue(code: ErrorCode, record: RecordRef, message: String) -> Diagnostic {
    warn!("{}: {} at {}", code, message, record);
    Diagnostic::warning(code, message).with_record(record)
}

/// Row conversion with diagnostic collection
#[derive(Default)]
struct Ingest {
    diagnostics: Vec<Diagnostic>,
}

impl Ingest {
    fn issue(&mut self, code: ErrorCode, record: RecordRef, message: String) {
        self.diagnostics.push(data_issue(code, record, message));
    }

    fn member_id(&mut self, table: TableKind, row: &Row<'_>) -> Option<String> {
        let member_id = row.text("member_id");
        if member_id.is_none() {
            self.issue(
                MQ0306,
                RecordRef::new(table, row.index()).column("member_id"),
                format!("{} record without member id ignored", table),
            );
        }
        member_id
    }

    fn date(&mut self, table: TableKind, row: &Row<'_>, member_id: &str, column: &str) -> Option<chrono::NaiveDate> {
        let text = row.text(column);
        let date = text.as_deref().and_then(parse_date);
        if date.is_none() {
            let message = match text {
                Some(raw) => format!("unparseable {} '{}'", column, raw),
                None => format!("missing {}", column),
            };
            self.issue(
                MQ0300,
                RecordRef::new(table, row.index()).member(member_id).column(column),
                message,
            );
        }
        date
    }

    fn member(&mut self, row: Row<'_>) -> Option<Member> {
        let member_id = self.member_id(TableKind::Members, &row)?;
        let at = || RecordRef::new(TableKind::Members, row.index()).member(member_id.as_str());

        let birth_text = row.text("birth_date");
        let birth_date = birth_text.as_deref().and_then(parse_date);
        if birth_date.is_none() {
            let message = match birth_text {
                Some(raw) => format!("invalid birth date '{}'", raw),
                None => "missing birth date".to_string(),
            };
            self.issue(MQ0301, at().column("birth_date"), message);
        }

        let gender = Gender::from(row.text("gender").unwrap_or_default());
        if !gender.is_known() {
            self.issue(
                MQ0305,
                at().column("gender"),
                format!("unknown gender '{}'", gender),
            );
        }

        let enrollment_months = match row.text("enrollment_months") {
            None => None,
            Some(raw) => {
                let months = parse_whole(&raw).and_then(|n| u32::try_from(n).ok());
                if months.is_none() {
                    self.issue(
                        MQ0303,
                        at().column("enrollment_months"),
                        format!("invalid enrollment months '{}'", raw),
                    );
                }
                months
            }
        };

        Some(Member {
            member_id,
            birth_date,
            gender,
            enrollment_months,
        })
    }

    fn claim(&mut self, row: Row<'_>) -> Option<ClaimEvent> {
        let member_id = self.member_id(TableKind::Claims, &row)?;
        let service_date = self.date(TableKind::Claims, &row, &member_id, "service_date");

        let claim_type = ClaimType::from(row.text("claim_type").unwrap_or_default());
        if let ClaimType::Other(raw) = &claim_type {
            self.issue(
                MQ0304,
                RecordRef::new(TableKind::Claims, row.index())
                    .member(member_id.as_str())
                    .column("claim_type"),
                format!("unknown claim type '{}'", raw),
            );
        }

        Some(ClaimEvent {
            diagnosis_code: row.text("diagnosis_code").as_deref().and_then(normalize_code),
            procedure_code: row.text("procedure_code").as_deref().and_then(normalize_code),
            provider_specialty: row.text("provider_specialty"),
            member_id,
            service_date,
            claim_type,
        })
    }

    fn fill(&mut self, row: Row<'_>) -> Option<PharmacyFill> {
        let member_id = self.member_id(TableKind::Pharmacy, &row)?;
        let fill_date = self.date(TableKind::Pharmacy, &row, &member_id, "fill_date");

        let days_supply = match row.text("days_supply") {
            None => None,
            Some(raw) => {
                let supply = parse_whole(&raw);
                if supply.is_none() {
                    self.issue(
                        MQ0302,
                        RecordRef::new(TableKind::Pharmacy, row.index())
                            .member(member_id.as_str())
                            .column("days_supply"),
                        format!("invalid days supply '{}', default applied", raw),
                    );
                }
                supply
            }
        };

        Some(PharmacyFill {
            medication_name: row.text("medication_name").unwrap_or_default(),
            member_id,
            fill_date,
            days_supply,
        })
    }

    fn lab(&mut self, row: Row<'_>) -> Option<LabResult> {
        let member_id = self.member_id(TableKind::Labs, &row)?;
        let test_date = self.date(TableKind::Labs, &row, &member_id, "test_date");

        Some(LabResult {
            test_code: row.text("test_code").as_deref().and_then(normalize_code),
            result_value: row.text("result_value"),
            member_id,
            test_date,
        })
    }
}

/// Parse an integer that may be written as `12`, `"12"` or `"12.0"`
fn parse_whole(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })
}
