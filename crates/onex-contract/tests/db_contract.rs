// crates/onex-contract/tests/db_contract.rs
// ============================================================================
// Module: DB Repository Contract Tests
// Description: Ordered validator chain coverage and first-failure semantics.
// Purpose: Ensure each stage rejects its violations and the chain stops early.
// Dependencies: onex-contract
// ============================================================================
//! ## Overview
//! Validates the DB contract chain: a clean contract passes every stage,
//! each stage catches its dedicated violation class, and a contract that
//! violates multiple stages reports only the earliest one.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

use std::collections::BTreeSet;

use onex_contract::DbContractValidation;
use onex_contract::DbRepositoryContract;
use onex_contract::DbValidationStage;
use onex_contract::SqlStatementSpec;
use onex_contract::validate_db_repository_contract;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Builds a clean, fully passing repository contract.
fn clean_contract() -> DbRepositoryContract {
    DbRepositoryContract {
        repository_id: "node_store.runs".to_string(),
        owning_node: "node_store".to_string(),
        allowed_tables: BTreeSet::from(["runs".to_string(), "artifacts".to_string()]),
        statements: vec![
            SqlStatementSpec {
                statement_id: "list_runs".to_string(),
                sql: "select run_id, status from runs where status = :status order by run_id"
                    .to_string(),
                tables: vec!["runs".to_string()],
                parameters: vec!["status".to_string()],
                returns_rows: true,
            },
            SqlStatementSpec {
                statement_id: "insert_artifact".to_string(),
                sql: "insert into artifacts (run_id, path) values (:run_id, :path)".to_string(),
                tables: vec!["artifacts".to_string()],
                parameters: vec!["run_id".to_string(), "path".to_string()],
                returns_rows: false,
            },
        ],
    }
}

/// Asserts the contract rejects at the given stage.
fn assert_rejects_at(contract: &DbRepositoryContract, expected: DbValidationStage) {
    match validate_db_repository_contract(contract) {
        DbContractValidation::Rejected {
            stage, ..
        } => assert_eq!(stage, expected),
        DbContractValidation::Valid => panic!("contract unexpectedly passed"),
    }
}

// ============================================================================
// SECTION: Passing Chain
// ============================================================================

#[test]
fn clean_contract_passes_every_stage() {
    assert!(validate_db_repository_contract(&clean_contract()).is_valid());
}

// ============================================================================
// SECTION: Per-Stage Rejections
// ============================================================================

#[test]
fn empty_statement_list_rejects_structurally() {
    let mut contract = clean_contract();
    contract.statements.clear();
    assert_rejects_at(&contract, DbValidationStage::Structural);
}

#[test]
fn duplicate_statement_ids_reject_structurally() {
    let mut contract = clean_contract();
    let duplicate = contract.statements[0].clone();
    contract.statements.push(duplicate);
    assert_rejects_at(&contract, DbValidationStage::Structural);
}

#[test]
fn embedded_statement_separator_rejects_as_unsafe() {
    let mut contract = clean_contract();
    contract.statements[0].sql =
        "select run_id from runs order by run_id; drop table runs".to_string();
    assert_rejects_at(&contract, DbValidationStage::SqlSafety);
}

#[test]
fn comment_sequences_reject_as_unsafe() {
    let mut contract = clean_contract();
    contract.statements[0].sql =
        "select run_id from runs -- hidden\norder by run_id".to_string();
    assert_rejects_at(&contract, DbValidationStage::SqlSafety);
}

#[test]
fn trailing_separator_is_tolerated() {
    let mut contract = clean_contract();
    contract.statements[1].sql =
        "insert into artifacts (run_id, path) values (:run_id, :path);".to_string();
    assert!(validate_db_repository_contract(&contract).is_valid());
}

#[test]
fn unlisted_table_rejects_access() {
    let mut contract = clean_contract();
    contract.statements[0].tables.push("secrets".to_string());
    assert_rejects_at(&contract, DbValidationStage::TableAccess);
}

#[test]
fn row_returning_statement_without_order_by_rejects() {
    let mut contract = clean_contract();
    contract.statements[0].sql =
        "select run_id, status from runs where status = :status".to_string();
    assert_rejects_at(&contract, DbValidationStage::DeterministicOrdering);
}

#[test]
fn declared_parameter_without_placeholder_rejects() {
    let mut contract = clean_contract();
    contract.statements[1].parameters.push("ghost".to_string());
    assert_rejects_at(&contract, DbValidationStage::ParameterBinding);
}

#[test]
fn undeclared_placeholder_rejects() {
    let mut contract = clean_contract();
    contract.statements[1].sql =
        "insert into artifacts (run_id, path) values (:run_id, :sneaky)".to_string();
    assert_rejects_at(&contract, DbValidationStage::ParameterBinding);
}

#[test]
fn repository_outside_owning_node_namespace_rejects() {
    let mut contract = clean_contract();
    contract.repository_id = "other_node.runs".to_string();
    assert_rejects_at(&contract, DbValidationStage::Ownership);
}

// ============================================================================
// SECTION: First Failure Wins
// ============================================================================

#[test]
fn earlier_stage_masks_later_violations() {
    let mut contract = clean_contract();
    // Violates SQL safety, table access, ordering, and ownership at once;
    // only the SQL safety stage may be reported.
    contract.statements[0].sql = "select * from secrets; -- exfil".to_string();
    contract.statements[0].tables.push("secrets".to_string());
    contract.statements[0].returns_rows = true;
    contract.repository_id = "foreign.runs".to_string();
    assert_rejects_at(&contract, DbValidationStage::SqlSafety);
}
