use crate::common::AppResult;
use crate::model::AvailabilityReport;
use std::path::Path;

/// 覆盖写入最新结果
pub async fn save(path: &Path, report: &AvailabilityReport) -> AppResult<()> {
    let mut content = serde_json::to_vec(report)?;
    content.push(b'\n');
    tokio::fs::write(path, content).await?;
    Ok(())
}

pub async fn load(path: &Path) -> AppResult<AvailabilityReport> {
    let content = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&content)?)
}
