//! Tests for the ledger normalization pass

mod common;

use common::{header_row, test_config};
use pcp_cli::errors::AppError;
use pcp_cli::ledger::MemoryLedger;
use pcp_cli::pipeline::{normalize_ledger, NormalizeSummary};

fn data_row(organization: &str, object: &str, link: &str) -> Vec<String> {
    vec![
        "Aberto".to_string(),
        "01/02/2024".to_string(),
        "20/02/2024".to_string(),
        "SP".to_string(),
        organization.to_string(),
        "Pregão 1/2024".to_string(),
        object.to_string(),
        link.to_string(),
        "05/02/2024".to_string(),
        "R$ 10,00".to_string(),
    ]
}

#[tokio::test]
async fn test_normalization_rewrites_objects_and_organizations() {
    let config = test_config(&["vigilancia"], &["SP"]);
    let ledger = MemoryLedger::with_rows(vec![
        header_row(),
        data_row(
            "PREFEITURA MUNICIPAL DE SÃO PAULO",
            "Contratação de vigilância armada",
            "https://portal.test/1",
        ),
        data_row("Santos", "Limpeza urbana", "https://portal.test/2"),
    ]);

    let summary = normalize_ledger(&ledger, &config).await.unwrap();

    assert_eq!(
        summary,
        NormalizeSummary {
            rows: 2,
            objects_changed: 1,
            organizations_changed: 1,
        }
    );
    let rows = ledger.rows();
    assert_eq!(rows[0], header_row());
    assert_eq!(rows[1][4], "São Paulo");
    assert_eq!(rows[1][6], "Vigilancia Armada");
    assert_eq!(rows[2][4], "Santos");
    assert_eq!(rows[2][6], "Limpeza urbana");
    assert_eq!(rows[1][7], "https://portal.test/1");
}

#[tokio::test]
async fn test_second_pass_changes_nothing() {
    let config = test_config(&["vigilancia"], &["SP"]);
    let ledger = MemoryLedger::with_rows(vec![
        header_row(),
        data_row(
            "Município de Campinas",
            "Serviços de CFTV e monitoramento",
            "https://portal.test/1",
        ),
        data_row(
            "câmara municipal de ribeirão preto",
            "Segurança eletrônica predial",
            "https://portal.test/2",
        ),
    ]);

    normalize_ledger(&ledger, &config).await.unwrap();
    let after_first = ledger.rows();

    let summary = normalize_ledger(&ledger, &config).await.unwrap();

    assert_eq!(summary.objects_changed, 0);
    assert_eq!(summary.organizations_changed, 0);
    assert_eq!(ledger.rows(), after_first);
}

#[tokio::test]
async fn test_missing_column_is_invalid_input() {
    let config = test_config(&["vigilancia"], &["SP"]);
    let mut header = header_row();
    header[6] = "Descrição".to_string();
    let ledger = MemoryLedger::with_rows(vec![
        header,
        data_row("Santos", "Vigilância", "https://portal.test/1"),
    ]);

    let result = normalize_ledger(&ledger, &config).await;

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn test_header_only_sheet_is_a_no_op() {
    let config = test_config(&["vigilancia"], &["SP"]);
    let ledger = MemoryLedger::with_rows(vec![header_row()]);

    let summary = normalize_ledger(&ledger, &config).await.unwrap();

    assert_eq!(summary, NormalizeSummary::default());
    assert_eq!(ledger.rows(), vec![header_row()]);
}
