// crates/onex-contract/src/db.rs
// ============================================================================
// Module: Onex DB Repository Contracts
// Description: Repository contract model and ordered validator chain.
// Purpose: Validate DB repository contracts with first-failure short-circuiting.
// Dependencies: crate::validators, serde
// ============================================================================

//! ## Overview
//! DB repository contracts run a dedicated validator chain: structural, SQL
//! safety, table-access allow-listing, deterministic ordering, parameter
//! binding, and ownership, in that order. The chain stops at the first
//! failing stage, mirroring the pipeline's short-circuit philosophy, and the
//! rejection names both the stage and the violated constraint.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::validators::ContractViolation;

// ============================================================================
// SECTION: Contract Model
// ============================================================================

/// One declared SQL statement in a repository contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlStatementSpec {
    /// Stable statement identifier.
    pub statement_id: String,
    /// SQL text with named `:parameter` placeholders.
    pub sql: String,
    /// Tables the statement touches.
    #[serde(default)]
    pub tables: Vec<String>,
    /// Declared named parameters, without the leading colon.
    #[serde(default)]
    pub parameters: Vec<String>,
    /// True when the statement returns a result set.
    #[serde(default)]
    pub returns_rows: bool,
}

/// DB repository contract validated by the dedicated chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbRepositoryContract {
    /// Repository identifier, prefixed by the owning node.
    pub repository_id: String,
    /// Node that owns the repository.
    pub owning_node: String,
    /// Tables the repository may touch.
    #[serde(default)]
    pub allowed_tables: BTreeSet<String>,
    /// Declared statements.
    #[serde(default)]
    pub statements: Vec<SqlStatementSpec>,
}

// ============================================================================
// SECTION: Validation Stages
// ============================================================================

/// Ordered validator chain stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DbValidationStage {
    /// Structural well-formedness.
    Structural,
    /// SQL safety screening.
    SqlSafety,
    /// Table-access allow-listing.
    TableAccess,
    /// Deterministic result ordering.
    DeterministicOrdering,
    /// Named parameter binding.
    ParameterBinding,
    /// Repository ownership.
    Ownership,
}

impl DbValidationStage {
    /// Stages in chain order.
    pub const CHAIN: [Self; 6] = [
        Self::Structural,
        Self::SqlSafety,
        Self::TableAccess,
        Self::DeterministicOrdering,
        Self::ParameterBinding,
        Self::Ownership,
    ];

    /// Returns the canonical snake_case stage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::SqlSafety => "sql_safety",
            Self::TableAccess => "table_access",
            Self::DeterministicOrdering => "deterministic_ordering",
            Self::ParameterBinding => "parameter_binding",
            Self::Ownership => "ownership",
        }
    }
}

impl fmt::Display for DbValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the DB repository contract chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DbContractValidation {
    /// All stages passed.
    Valid,
    /// A stage failed and stopped the chain.
    Rejected {
        /// Failing stage.
        stage: DbValidationStage,
        /// Violated constraint.
        violation: ContractViolation,
    },
}

impl DbContractValidation {
    /// Returns true when the chain passed.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

// ============================================================================
// SECTION: Validator Chain
// ============================================================================

/// Validates a DB repository contract through the ordered chain.
///
/// The chain stops at the first failing stage; later stages never run.
#[must_use]
pub fn validate_db_repository_contract(contract: &DbRepositoryContract) -> DbContractValidation {
    for stage in DbValidationStage::CHAIN {
        let violation = match stage {
            DbValidationStage::Structural => check_structural(contract),
            DbValidationStage::SqlSafety => check_sql_safety(contract),
            DbValidationStage::TableAccess => check_table_access(contract),
            DbValidationStage::DeterministicOrdering => check_deterministic_ordering(contract),
            DbValidationStage::ParameterBinding => check_parameter_binding(contract),
            DbValidationStage::Ownership => check_ownership(contract),
        };
        if let Some(violation) = violation {
            return DbContractValidation::Rejected {
                stage,
                violation,
            };
        }
    }
    DbContractValidation::Valid
}

/// Checks structural well-formedness.
fn check_structural(contract: &DbRepositoryContract) -> Option<ContractViolation> {
    if contract.repository_id.trim().is_empty() {
        return Some(ContractViolation::new(
            "db.structural.repository_id",
            "repository identifier is empty",
        ));
    }
    if contract.statements.is_empty() {
        return Some(ContractViolation::new(
            "db.structural.statements",
            "contract declares no statements",
        ));
    }
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for statement in &contract.statements {
        if statement.statement_id.trim().is_empty() {
            return Some(ContractViolation::new(
                "db.structural.statement_id",
                "statement identifier is empty",
            ));
        }
        if !seen.insert(statement.statement_id.as_str()) {
            return Some(ContractViolation::new(
                "db.structural.duplicate_statement",
                format!("duplicate statement id {}", statement.statement_id),
            ));
        }
        if statement.sql.trim().is_empty() {
            return Some(ContractViolation::new(
                "db.structural.sql",
                format!("statement {} has empty sql", statement.statement_id),
            ));
        }
    }
    None
}

/// Screens SQL text for multi-statement and comment injection vectors.
fn check_sql_safety(contract: &DbRepositoryContract) -> Option<ContractViolation> {
    for statement in &contract.statements {
        let sql = statement.sql.trim_end();
        let body = sql.strip_suffix(';').unwrap_or(sql);
        if body.contains(';') {
            return Some(ContractViolation::new(
                "db.sql_safety.multi_statement",
                format!("statement {} contains an embedded statement separator", statement.statement_id),
            ));
        }
        if body.contains("--") || body.contains("/*") {
            return Some(ContractViolation::new(
                "db.sql_safety.comment",
                format!("statement {} contains a comment sequence", statement.statement_id),
            ));
        }
    }
    None
}

/// Enforces the table-access allow-list.
fn check_table_access(contract: &DbRepositoryContract) -> Option<ContractViolation> {
    for statement in &contract.statements {
        for table in &statement.tables {
            if !contract.allowed_tables.contains(table) {
                return Some(ContractViolation::new(
                    "db.table_access.denied",
                    format!("statement {} touches unlisted table {table}", statement.statement_id),
                ));
            }
        }
    }
    None
}

/// Requires deterministic ordering on row-returning statements.
fn check_deterministic_ordering(contract: &DbRepositoryContract) -> Option<ContractViolation> {
    for statement in &contract.statements {
        if statement.returns_rows && !statement.sql.to_ascii_lowercase().contains("order by") {
            return Some(ContractViolation::new(
                "db.deterministic_ordering.missing",
                format!("statement {} returns rows without an order by clause", statement.statement_id),
            ));
        }
    }
    None
}

/// Checks declared parameters against `:name` placeholders.
fn check_parameter_binding(contract: &DbRepositoryContract) -> Option<ContractViolation> {
    for statement in &contract.statements {
        let placeholders = collect_placeholders(&statement.sql);
        for parameter in &statement.parameters {
            if !placeholders.contains(parameter.as_str()) {
                return Some(ContractViolation::new(
                    "db.parameter_binding.unused",
                    format!(
                        "statement {} declares parameter {parameter} with no placeholder",
                        statement.statement_id
                    ),
                ));
            }
        }
        for placeholder in &placeholders {
            if !statement.parameters.iter().any(|parameter| parameter == placeholder) {
                return Some(ContractViolation::new(
                    "db.parameter_binding.undeclared",
                    format!(
                        "statement {} binds undeclared placeholder {placeholder}",
                        statement.statement_id
                    ),
                ));
            }
        }
    }
    None
}

/// Requires repository ids to be namespaced under the owning node.
fn check_ownership(contract: &DbRepositoryContract) -> Option<ContractViolation> {
    if contract.owning_node.trim().is_empty() {
        return Some(ContractViolation::new(
            "db.ownership.owning_node",
            "owning node is empty",
        ));
    }
    let prefix = format!("{}.", contract.owning_node);
    if !contract.repository_id.starts_with(&prefix) {
        return Some(ContractViolation::new(
            "db.ownership.prefix",
            format!(
                "repository {} is not namespaced under owning node {}",
                contract.repository_id, contract.owning_node
            ),
        ));
    }
    None
}

// ============================================================================
// SECTION: Placeholder Scanning
// ============================================================================

/// Collects named `:parameter` placeholders from SQL text.
fn collect_placeholders(sql: &str) -> BTreeSet<String> {
    let mut placeholders = BTreeSet::new();
    let bytes = sql.as_bytes();
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b':' {
            let start = index + 1;
            let mut end = start;
            while end < bytes.len()
                && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_')
            {
                end += 1;
            }
            if end > start && bytes[start].is_ascii_alphabetic() {
                placeholders.insert(sql[start..end].to_string());
            }
            index = end;
        } else {
            index += 1;
        }
    }
    placeholders
}
