use crate::core::enablement::Enablement;
use crate::core::library::Library;
use crate::core::stager::{StagedAddon, Stager};
use crate::models::error::SError;
use crate::models::install::{AddonInstallResult, InstallResult};
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Where and how staged packages land.
#[derive(Debug, Clone)]
pub struct InstallTarget {
    pub community: Utf8PathBuf,
    pub auto_enable: bool,
}

type Staged = (Utf8PathBuf, Result<StagedAddon, SError>);

pub struct Installer;

impl Installer {
    /// Installs every source one after the other. One result per source, in input order.
    pub fn install(
        library: &Library,
        target: &InstallTarget,
        sources: &[Utf8PathBuf],
    ) -> InstallResult {
        let staged = sources
            .iter()
            .map(|source| (source.clone(), Stager::stage(source, &library.paths.staging)))
            .collect();
        Self::commit_all(library, target, staged)
    }

    /// Stages the sources concurrently (bounded by `permits`) on the blocking pool,
    /// then commits them serially in input order.
    pub async fn install_parallel(
        library: Arc<Library>,
        target: InstallTarget,
        sources: Vec<Utf8PathBuf>,
        permits: Arc<Semaphore>,
    ) -> Result<InstallResult, SError> {
        let handles: Vec<_> = sources
            .into_iter()
            .map(|source| {
                let staging = library.paths.staging.clone();
                let permits = permits.clone();
                tokio::spawn(async move {
                    let input = source.clone();
                    let staged = match permits.acquire_owned().await {
                        Ok(_permit) => {
                            tokio::task::spawn_blocking(move || Stager::stage(&input, &staging))
                                .await
                                .unwrap_or_else(|e| Err(e.into()))
                        }
                        Err(e) => Err(SError::AsyncRuntimeError(e.to_string())),
                    };
                    (source, staged)
                })
            })
            .collect();

        let mut staged = Vec::with_capacity(handles.len());
        for handle in handles {
            staged.push(handle.await?);
        }

        tokio::task::spawn_blocking(move || Self::commit_all(&library, &target, staged))
            .await
            .map_err(Into::into)
    }

    fn commit_all(
        library: &Library,
        target: &InstallTarget,
        staged: Vec<Staged>,
    ) -> InstallResult {
        let results = staged
            .into_iter()
            .map(|(source, staged)| {
                let outcome = staged.and_then(|staged| {
                    let committed = Self::commit_one(library, target, &staged);
                    if let Err(e) = Stager::clean_up(&staged) {
                        warn!("Unable to clean staging for {source}: {e}");
                    }
                    committed
                });
                match outcome {
                    Ok(id) => AddonInstallResult::Success { id },
                    Err(e) => {
                        warn!("Install of {source} failed: {e}");
                        AddonInstallResult::Failure {
                            file: display_name(&source),
                            error: e.to_string(),
                        }
                    }
                }
            })
            .collect();

        InstallResult { results }
    }

    fn commit_one(
        library: &Library,
        target: &InstallTarget,
        staged: &StagedAddon,
    ) -> Result<String, SError> {
        debug!("Committing staged addon {:?}", staged.id);
        let id = library.commit(staged)?;
        if target.auto_enable {
            // The add-on stays installed even when linking it fails.
            Enablement::enable(library, &target.community, &id)?;
        }
        info!("Installed addon '{id}'");
        Ok(id)
    }
}

fn display_name(source: &Utf8Path) -> String {
    source.file_name().unwrap_or(source.as_str()).to_string()
}
