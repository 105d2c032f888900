//! Uploads a generated project into a repository, one file per request.
//!
//! Publishing runs in two phases. Regular files are written in order and a
//! failing file is recorded and skipped. The trigger file (the CI workflow)
//! is written only after every regular file has been attempted, because its
//! arrival starts the APK build.

use crate::github::{RepositoryHandle, RepositoryHost};
use crate::llm_generator::GeneratedSource;
use crate::templates;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// A file to write into the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub path: String,
    pub content: Vec<u8>,
}

impl FilePayload {
    pub fn text(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into().into_bytes(),
        }
    }
}

/// Ordered project files with the build trigger held apart.
#[derive(Debug, Clone)]
pub struct ProjectStructure {
    pub regular_files: Vec<FilePayload>,
    pub trigger_file: FilePayload,
}

impl ProjectStructure {
    /// Configuration files, then the generated source, then the Android
    /// embedding; the workflow is kept as the trigger.
    pub fn new(source: GeneratedSource, app_description: &str, trial_days: u32) -> Self {
        let app_name = templates::app_name_from_description(app_description);

        let regular_files = vec![
            FilePayload::text("pubspec.yaml", templates::pubspec(&app_name)),
            FilePayload::text("analysis_options.yaml", templates::analysis_options()),
            FilePayload::text(".gitignore", templates::gitignore()),
            FilePayload::text(
                "README.md",
                templates::readme(&app_name, app_description, trial_days),
            ),
            FilePayload::text(templates::MAIN_DART_PATH, source.text),
            FilePayload::text("android/build.gradle", templates::root_build_gradle()),
            FilePayload::text("android/settings.gradle", templates::settings_gradle()),
            FilePayload::text("android/gradle.properties", templates::gradle_properties()),
            FilePayload::text(
                "android/gradle/wrapper/gradle-wrapper.properties",
                templates::gradle_wrapper_properties(),
            ),
            FilePayload::text("android/app/build.gradle", templates::app_build_gradle()),
            FilePayload::text(
                "android/app/src/main/AndroidManifest.xml",
                templates::android_manifest(&app_name),
            ),
            FilePayload::text(templates::main_activity_path(), templates::main_activity()),
            FilePayload::text(
                "android/app/src/main/res/values/styles.xml",
                templates::styles_xml(),
            ),
            FilePayload::text(
                "android/app/src/main/res/drawable/launch_background.xml",
                templates::launch_background_xml(),
            ),
            FilePayload::text(
                "android/app/src/main/res/drawable/ic_launcher.xml",
                templates::launcher_icon_xml(),
            ),
        ];

        Self {
            regular_files,
            trigger_file: FilePayload::text(templates::WORKFLOW_PATH, templates::build_workflow()),
        }
    }

    /// Every file in upload order, trigger last.
    pub fn files(&self) -> impl Iterator<Item = &FilePayload> {
        self.regular_files.iter().chain(std::iter::once(&self.trigger_file))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: String,
    pub error: String,
}

/// Outcome of a publish run, in attempt order.
#[derive(Debug, Clone, Default)]
pub struct PublishReport {
    pub written: Vec<String>,
    pub failed: Vec<FileFailure>,
}

impl PublishReport {
    pub fn attempted(&self) -> usize {
        self.written.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Publisher {
    host: Arc<dyn RepositoryHost>,
    pause: Duration,
}

impl Publisher {
    /// `pause` separates consecutive writes.
    pub fn new(host: Arc<dyn RepositoryHost>, pause: Duration) -> Self {
        Self { host, pause }
    }

    pub async fn publish(
        &self,
        repo: &RepositoryHandle,
        source: GeneratedSource,
        app_description: &str,
        trial_days: u32,
    ) -> PublishReport {
        let structure = ProjectStructure::new(source, app_description, trial_days);
        self.publish_structure(repo, &structure).await
    }

    /// Never fails as a whole; per-file errors end up in the report.
    pub async fn publish_structure(
        &self,
        repo: &RepositoryHandle,
        structure: &ProjectStructure,
    ) -> PublishReport {
        let mut report = PublishReport::default();
        info!(
            "Publishing {} files to {}",
            structure.regular_files.len() + 1,
            repo.url
        );

        for file in &structure.regular_files {
            self.write_one(repo, file, &mut report).await;
        }

        // Trigger goes last, whatever happened above.
        self.write_one(repo, &structure.trigger_file, &mut report).await;

        if report.is_complete() {
            info!("Published {} files to {}", report.written.len(), repo.name);
        } else {
            warn!(
                "Published {} of {} files to {}; failed: {:?}",
                report.written.len(),
                report.attempted(),
                repo.name,
                report.failed.iter().map(|f| f.path.as_str()).collect::<Vec<_>>()
            );
        }

        report
    }

    async fn write_one(&self, repo: &RepositoryHandle, file: &FilePayload, report: &mut PublishReport) {
        if report.attempted() > 0 && !self.pause.is_zero() {
            tokio::time::sleep(self.pause).await;
        }

        match self.host.write_file(repo, file).await {
            Ok(()) => {
                info!("Wrote {}", file.path);
                report.written.push(file.path.clone());
            }
            Err(err) => {
                warn!("Failed to write {}: {:#}", file.path, err);
                report.failed.push(FileFailure {
                    path: file.path.clone(),
                    error: format!("{:#}", err),
                });
            }
        }
    }
}
