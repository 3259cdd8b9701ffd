//! `folio check`.

use anyhow::{bail, Context, Result};
use folio_shared::{AuditReport, ContentRepository, ContentSource, ContentType};

use crate::utils::format_audit;

/// Audit reports for every content type.
pub async fn audit_all<S: ContentSource>(repo: &ContentRepository<S>) -> Vec<AuditReport> {
    let mut reports = Vec::with_capacity(ContentType::ALL.len());
    for content_type in ContentType::ALL {
        reports.push(repo.audit(content_type).await);
    }
    reports
}

/// Fails when any content type has slug collisions or unreadable files.
pub async fn run<S: ContentSource>(repo: &ContentRepository<S>, json: bool) -> Result<()> {
    let reports = audit_all(repo).await;

    if json {
        let output = serde_json::to_string_pretty(&reports).context("Failed to serialize audit")?;
        println!("{output}");
    } else {
        for report in &reports {
            print!("{}", format_audit(report, repo.root()));
        }
    }

    let failing: Vec<String> = reports
        .iter()
        .filter(|report| !report.is_clean())
        .map(|report| report.content_type.to_string())
        .collect();
    if !failing.is_empty() {
        bail!("Content check failed for: {}", failing.join(", "));
    }
    tracing::info!("Content check passed");
    Ok(())
}
