use crate::config::RewriteConfig;
use crate::domain::ast::CompilationUnit;
use crate::domain::rewriter::{RewriteSummary, TestClassRewriter};
use crate::ports::{ShadowTypeResolver, UnitExporter};
use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// One loaded test unit together with the class it tests.
#[derive(Debug, Clone)]
pub struct RewriteJob {
    pub source: String,
    pub package: String,
    pub class_under_test: String,
    pub unit: CompilationUnit,
}

impl RewriteJob {
    /// The class under test is the first top-level class name minus the
    /// configured test-class suffix (`DemoTest` -> `Demo`).
    pub fn from_unit(source: &str, unit: CompilationUnit, config: &RewriteConfig) -> Result<Self> {
        let test_class = unit
            .types
            .first()
            .map(|class| class.name.as_str())
            .ok_or_else(|| anyhow!("{} declares no top-level class", source))?;
        let class_under_test = config.class_under_test(test_class).ok_or_else(|| {
            anyhow!(
                "{}: class {} does not end with suffix {:?}",
                source,
                test_class,
                config.test_class_suffix
            )
        })?;

        Ok(Self {
            source: source.to_string(),
            package: unit.package.clone().unwrap_or_default(),
            class_under_test,
            unit,
        })
    }

    /// Test class name as declared, used to name exported files.
    pub fn test_class_name(&self) -> &str {
        self.unit.types.first().map(|c| c.name.as_str()).unwrap_or("Unnamed")
    }
}

pub struct RewriteUsecase<'a> {
    pub resolver: &'a dyn ShadowTypeResolver,
    pub exporter: &'a dyn UnitExporter,
    pub config: &'a RewriteConfig,
}

impl<'a> RewriteUsecase<'a> {
    pub fn rewrite(&self, job: &mut RewriteJob) -> RewriteSummary {
        let rewriter =
            TestClassRewriter::new(self.config, self.resolver, &job.package, &job.class_under_test);
        rewriter.rewrite(&mut job.unit)
    }

    /// Rewrites every job on the rayon pool. Each job gets its own rewriter.
    pub fn rewrite_all(&self, jobs: &mut [RewriteJob]) -> Vec<RewriteSummary> {
        jobs.par_iter_mut().map(|job| self.rewrite(job)).collect()
    }

    /// Rewrite all jobs and export them under `out_dir`, mirroring packages.
    pub fn run(&self, jobs: &mut [RewriteJob], out_dir: &Path) -> Result<Vec<PathBuf>> {
        let summaries = self.rewrite_all(jobs);

        let mut written = Vec::with_capacity(jobs.len());
        for (job, summary) in jobs.iter().zip(&summaries) {
            let dir = out_dir.join(job.package.replace('.', "/"));
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            let path = dir.join(format!("{}.{}", job.test_class_name(), self.exporter.extension()));
            self.exporter
                .export(&job.unit, &path)
                .with_context(|| format!("Failed to export {}", path.display()))?;
            info!(
                source = job.source.as_str(),
                output = %path.display(),
                tracked = summary.tracked_instances.len(),
                "unit exported"
            );
            written.push(path);
        }
        Ok(written)
    }
}
