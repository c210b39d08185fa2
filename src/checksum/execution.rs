// Execution engine
// Computes every (file, algorithm) digest and fans it out to the targets

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, warn};

use super::digest::DigesterRegistry;
use super::error::ChecksumError;
use super::file::ChecksumFile;
use super::target::ExecutionTarget;

/// What an execution does when something goes wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// The first error aborts the run; targets not yet closed are never closed
    #[default]
    Abort,
    /// Errors are logged and the run moves on to the next combination
    ContinueAndLog,
}

/// Statistics collected during an execution
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ExecutionStats {
    pub files_processed: usize,
    pub digests_computed: usize,
    pub failures: usize,
    #[serde(serialize_with = "serialize_duration")]
    pub duration: Duration,
}

// Helper function to serialize Duration as seconds
fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

/// One configured run: files, algorithms, targets and a failure policy
///
/// Files are processed in the order given, algorithms in the order configured
/// and targets in the order added. An execution runs exactly once.
pub struct Execution {
    registry: Arc<DigesterRegistry>,
    files: Vec<ChecksumFile>,
    algorithms: Vec<String>,
    targets: Vec<Box<dyn ExecutionTarget>>,
    sub_path: Option<PathBuf>,
    salt: Option<Vec<u8>>,
    policy: FailurePolicy,
    fail_if_no_files: bool,
    fail_if_no_algorithms: bool,
    fail_if_no_targets: bool,
}

impl Execution {
    pub fn new(registry: Arc<DigesterRegistry>, policy: FailurePolicy) -> Self {
        Self {
            registry,
            files: Vec::new(),
            algorithms: Vec::new(),
            targets: Vec::new(),
            sub_path: None,
            salt: None,
            policy,
            fail_if_no_files: true,
            fail_if_no_algorithms: true,
            fail_if_no_targets: true,
        }
    }

    pub fn add_file(&mut self, file: ChecksumFile) -> &mut Self {
        self.files.push(file);
        self
    }

    pub fn set_files(&mut self, files: Vec<ChecksumFile>) -> &mut Self {
        self.files = files;
        self
    }

    pub fn files(&self) -> &[ChecksumFile] {
        &self.files
    }

    pub fn add_algorithm(&mut self, algorithm: impl Into<String>) -> &mut Self {
        self.algorithms.push(algorithm.into());
        self
    }

    pub fn set_algorithms<I, S>(&mut self, algorithms: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.algorithms = algorithms.into_iter().map(Into::into).collect();
        self
    }

    pub fn algorithms(&self) -> &[String] {
        &self.algorithms
    }

    pub fn add_target(&mut self, target: Box<dyn ExecutionTarget>) -> &mut Self {
        self.targets.push(target);
        self
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Root below the base path that report paths are made relative to
    pub fn set_sub_path(&mut self, sub_path: Option<PathBuf>) -> &mut Self {
        self.sub_path = sub_path;
        self
    }

    /// Bytes appended to every file before digesting (CRC32 only)
    pub fn set_salt(&mut self, salt: Option<Vec<u8>>) -> &mut Self {
        self.salt = salt;
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn set_fail_if_no_files(&mut self, fail: bool) -> &mut Self {
        self.fail_if_no_files = fail;
        self
    }

    pub fn set_fail_if_no_algorithms(&mut self, fail: bool) -> &mut Self {
        self.fail_if_no_algorithms = fail;
        self
    }

    pub fn set_fail_if_no_targets(&mut self, fail: bool) -> &mut Self {
        self.fail_if_no_targets = fail;
        self
    }

    /// Reject empty file, algorithm or target lists when configured to
    pub fn check_parameters(&self) -> Result<(), ChecksumError> {
        if self.fail_if_no_files && self.files.is_empty() {
            return Err(ChecksumError::NoFilesConfigured);
        }
        if self.fail_if_no_algorithms && self.algorithms.is_empty() {
            return Err(ChecksumError::NoAlgorithmsConfigured);
        }
        if self.fail_if_no_targets && self.targets.is_empty() {
            return Err(ChecksumError::NoTargetsConfigured);
        }
        Ok(())
    }

    /// Run the execution under its failure policy
    pub fn run(self) -> Result<ExecutionStats, ChecksumError> {
        match self.policy {
            FailurePolicy::Abort => self.run_fail_fast(),
            FailurePolicy::ContinueAndLog => self.run_best_effort(),
        }
    }

    /// Digest `file` with `algorithm`, returning the canonical algorithm name with it
    fn compute(&self, file: &ChecksumFile, algorithm: &str) -> Result<(&'static str, String), ChecksumError> {
        let digester = self.registry.get(algorithm)?;
        let name = digester.algorithm();
        debug!("Computing {} checksum for {}", name, file.path().display());
        let digest = digester
            .calculate_salted(file.path(), self.salt.as_deref())
            .map_err(|e| ChecksumError::digest_failure(&file.file_name(), name, &e))?;
        Ok((name, digest))
    }

    fn run_fail_fast(mut self) -> Result<ExecutionStats, ChecksumError> {
        let start = Instant::now();
        self.check_parameters()?;

        for target in self.targets.iter_mut() {
            target.init()?;
        }

        let mut stats = ExecutionStats::default();
        let mut targets = std::mem::take(&mut self.targets);

        for file in &self.files {
            debug!("Processing file {}", file.path().display());
            for algorithm in &self.algorithms {
                let (name, digest) = self.compute(file, algorithm)?;
                stats.digests_computed += 1;

                for target in targets.iter_mut() {
                    target.write(&digest, file, name)?;
                }
            }
            stats.files_processed += 1;
        }

        for target in targets.iter_mut() {
            target.close(self.sub_path.as_deref())?;
        }

        stats.duration = start.elapsed();
        Ok(stats)
    }

    fn run_best_effort(mut self) -> Result<ExecutionStats, ChecksumError> {
        let start = Instant::now();
        self.check_parameters()?;

        let mut stats = ExecutionStats::default();

        // A target that fails to initialize is left out of the rest of the run
        let mut targets: Vec<Box<dyn ExecutionTarget>> = Vec::with_capacity(self.targets.len());
        for mut target in std::mem::take(&mut self.targets) {
            match target.init() {
                Ok(()) => targets.push(target),
                Err(e) => {
                    error!("{}", e);
                    stats.failures += 1;
                }
            }
        }

        for file in &self.files {
            debug!("Processing file {}", file.path().display());
            let mut file_failed = false;
            for algorithm in &self.algorithms {
                let (name, digest) = match self.compute(file, algorithm) {
                    Ok(computed) => computed,
                    Err(e) => {
                        warn!("{}", e);
                        stats.failures += 1;
                        file_failed = true;
                        continue;
                    }
                };
                stats.digests_computed += 1;

                for target in targets.iter_mut() {
                    if let Err(e) = target.write(&digest, file, name) {
                        warn!("{}", e);
                        stats.failures += 1;
                    }
                }
            }
            if !file_failed {
                stats.files_processed += 1;
            }
        }

        for target in targets.iter_mut() {
            if let Err(e) = target.close(self.sub_path.as_deref()) {
                error!("{}", e);
                stats.failures += 1;
            }
        }

        stats.duration = start.elapsed();
        Ok(stats)
    }
}
