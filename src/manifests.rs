//! Kubernetes/ArgoCD manifest builders for the demo deployment.
//!
//! Each builder is a pure function of [`ManifestParams`]; serialization to
//! YAML and file output live in the `generate_manifests` binary.

use serde_json::{json, Value};
use std::env;

const CONTAINER_PORT: u16 = 5000;
const REPLICAS: u32 = 2;

/// Inputs for one manifest set.
#[derive(Debug, Clone)]
pub struct ManifestParams {
    pub app_name: String,
    pub image_tag: String,
    pub namespace: String,
    pub repo_url: String,
    pub manifests_path: String,
    pub ingress_host: String,
    pub environment: String,
}

impl ManifestParams {
    /// Read parameters from the environment, with the same defaults the
    /// deployment pipeline assumes.
    pub fn from_env() -> Self {
        let app_name = env_or("APP_NAME", "devops-app");
        let ingress_host =
            env::var("INGRESS_HOST").unwrap_or_else(|_| format!("{app_name}.example.com"));

        Self {
            image_tag: env_or("IMAGE_TAG", "latest"),
            namespace: env_or("NAMESPACE", "default"),
            repo_url: env_or("REPO_URL", "https://github.com/user/repo.git"),
            manifests_path: env_or("MANIFESTS_PATH", "manifests"),
            environment: env_or("ENVIRONMENT", "production"),
            app_name,
            ingress_host,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn deployment(params: &ManifestParams) -> Value {
    json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {
            "name": params.app_name,
            "namespace": params.namespace,
            "labels": {
                "app": params.app_name,
                "version": params.image_tag,
            },
        },
        "spec": {
            "replicas": REPLICAS,
            "selector": {
                "matchLabels": {
                    "app": params.app_name,
                },
            },
            "template": {
                "metadata": {
                    "labels": {
                        "app": params.app_name,
                        "version": params.image_tag,
                    },
                },
                "spec": {
                    "containers": [{
                        "name": params.app_name,
                        "image": format!("{}:{}", params.app_name, params.image_tag),
                        "ports": [{
                            "containerPort": CONTAINER_PORT,
                            "protocol": "TCP",
                        }],
                        "env": [
                            {"name": "APP_VERSION", "value": params.image_tag},
                            {"name": "ENVIRONMENT", "value": params.environment},
                            {"name": "PORT", "value": CONTAINER_PORT.to_string()},
                        ],
                        "resources": {
                            "requests": {
                                "memory": "128Mi",
                                "cpu": "100m",
                            },
                            "limits": {
                                "memory": "256Mi",
                                "cpu": "500m",
                            },
                        },
                        "livenessProbe": {
                            "httpGet": {
                                "path": "/",
                                "port": CONTAINER_PORT,
                            },
                            "initialDelaySeconds": 30,
                            "periodSeconds": 10,
                        },
                        "readinessProbe": {
                            "httpGet": {
                                "path": "/",
                                "port": CONTAINER_PORT,
                            },
                            "initialDelaySeconds": 5,
                            "periodSeconds": 5,
                        },
                    }],
                },
            },
        },
    })
}

pub fn service(params: &ManifestParams) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": {
            "name": format!("{}-service", params.app_name),
            "namespace": params.namespace,
            "labels": {
                "app": params.app_name,
            },
        },
        "spec": {
            "type": "ClusterIP",
            "ports": [{
                "port": 80,
                "targetPort": CONTAINER_PORT,
                "protocol": "TCP",
                "name": "http",
            }],
            "selector": {
                "app": params.app_name,
            },
        },
    })
}

pub fn ingress(params: &ManifestParams) -> Value {
    json!({
        "apiVersion": "networking.k8s.io/v1",
        "kind": "Ingress",
        "metadata": {
            "name": format!("{}-ingress", params.app_name),
            "namespace": params.namespace,
            "annotations": {
                "kubernetes.io/ingress.class": "nginx",
                "cert-manager.io/cluster-issuer": "letsencrypt-prod",
            },
        },
        "spec": {
            "tls": [{
                "hosts": [params.ingress_host],
                "secretName": format!("{}-tls", params.app_name),
            }],
            "rules": [{
                "host": params.ingress_host,
                "http": {
                    "paths": [{
                        "path": "/",
                        "pathType": "Prefix",
                        "backend": {
                            "service": {
                                "name": format!("{}-service", params.app_name),
                                "port": {
                                    "number": 80,
                                },
                            },
                        },
                    }],
                },
            }],
        },
    })
}

/// ArgoCD Application pointing the cluster at the generated manifests.
pub fn argocd_application(params: &ManifestParams) -> Value {
    json!({
        "apiVersion": "argoproj.io/v1alpha1",
        "kind": "Application",
        "metadata": {
            "name": params.app_name,
            "namespace": "argocd",
            "finalizers": ["resources-finalizer.argocd.argoproj.io"],
        },
        "spec": {
            "project": "default",
            "source": {
                "repoURL": params.repo_url,
                "targetRevision": "HEAD",
                "path": params.manifests_path,
            },
            "destination": {
                "server": "https://kubernetes.default.svc",
                "namespace": params.namespace,
            },
            "syncPolicy": {
                "automated": {
                    "prune": true,
                    "selfHeal": true,
                },
                "syncOptions": ["CreateNamespace=true"],
            },
        },
    })
}
