//! Generate static files

use anyhow::Result;
use std::sync::Arc;

use crate::content::PostSource;
use crate::generator::{GenerateReport, Generator};
use crate::Blog;

/// Generate the static site from the configured content service
pub async fn run(blog: &Blog) -> Result<GenerateReport> {
    let client = blog.content_client()?;
    run_with_source(blog, Arc::new(client)).await
}

/// Generate the static site from any post source
pub async fn run_with_source(blog: &Blog, source: Arc<dyn PostSource>) -> Result<GenerateReport> {
    let start = std::time::Instant::now();

    let generator = Generator::new(blog, source)?;
    let report = generator.generate().await?;

    tracing::info!(
        "Generated {} posts, {} list pages ({} skipped, {} assets)",
        report.posts,
        report.list_pages,
        report.skipped.len(),
        report.assets
    );

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(report)
}
