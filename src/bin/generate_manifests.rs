//! Emits the Kubernetes/ArgoCD manifest set for the demo application.
//!
//! Reads its parameters from the environment (APP_NAME, IMAGE_TAG,
//! NAMESPACE, REPO_URL, MANIFESTS_PATH, INGRESS_HOST, ENVIRONMENT) and
//! writes one YAML file per document into the target directory.

use anyhow::{Context, Result};
use devops_demo::manifests::{self, ManifestParams};
use serde_json::Value;
use std::fs;
use std::path::Path;

fn main() -> Result<()> {
    let params = ManifestParams::from_env();

    let out_dir = Path::new(&params.manifests_path);
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let documents = [
        ("deployment.yaml", manifests::deployment(&params)),
        ("service.yaml", manifests::service(&params)),
        ("ingress.yaml", manifests::ingress(&params)),
        (
            "argocd-application.yaml",
            manifests::argocd_application(&params),
        ),
    ];

    for (file_name, document) in &documents {
        write_manifest(out_dir, file_name, document)?;
    }

    println!("Generated manifests in {}/", out_dir.display());
    for (file_name, _) in &documents {
        println!("  - {file_name}");
    }

    Ok(())
}

fn write_manifest(dir: &Path, file_name: &str, document: &Value) -> Result<()> {
    let yaml =
        serde_yaml::to_string(document).with_context(|| format!("failed to render {file_name}"))?;
    let path = dir.join(file_name);
    fs::write(&path, yaml).with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}
