//! Show what a launch would do, without launching.

use anyhow::{Context, Result};
use apprun_core::{EnvMap, HostProbe, Invocation, LaunchPlan, ResolveOptions, Resolver};
use apprun_schema::PathPolicy;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// What to resolve.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    /// Invoked name to resolve as.
    pub invoked_as: OsString,
    /// Arguments after the invoked name.
    pub args: Vec<OsString>,
    /// Policy replacing the manifest's and `APPRUN_PATH_POLICY`.
    pub policy: Option<PathPolicy>,
    /// Directories added after any from `APPRUN_EXTRA_PATH`.
    pub extra_paths: Vec<PathBuf>,
}

/// Resolve `request` against `root` and the current environment and print
/// the resulting plan.
///
/// # Errors
///
/// Fails if the manifest cannot be loaded or resolution fails, e.g. because
/// the selected binary is missing.
pub fn plan(root: &Path, request: PlanRequest, json: bool) -> Result<()> {
    let manifest = super::load_manifest(root)?;
    let env = EnvMap::from_host();

    let mut options = ResolveOptions::from_env(&manifest, &env)?;
    if let Some(policy) = request.policy {
        options.policy = policy;
    }
    options.extra_dirs.extend(request.extra_paths);

    let invocation = Invocation::new(request.invoked_as, request.args);
    let plan = Resolver::new(root, &manifest, &HostProbe)
        .with_options(options)
        .resolve(&invocation, &env)
        .with_context(|| {
            format!(
                "Failed to resolve {} under {}",
                invocation.invoked_name_lossy(),
                root.display()
            )
        })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&to_json(&plan))?);
    } else {
        print_text(&plan);
    }
    Ok(())
}

fn lossy(s: &OsStr) -> String {
    s.to_string_lossy().into_owned()
}

fn to_json(plan: &LaunchPlan) -> serde_json::Value {
    let env: serde_json::Map<String, serde_json::Value> = plan
        .env
        .iter()
        .map(|(k, v)| (lossy(k), serde_json::Value::String(lossy(v))))
        .collect();
    serde_json::json!({
        "target": plan.target.display().to_string(),
        "kind": plan.kind.as_str(),
        "policy": plan.policy.as_str(),
        "args": plan.args.iter().map(|a| lossy(a)).collect::<Vec<_>>(),
        "unset": plan.unset.iter().map(|v| lossy(v)).collect::<Vec<_>>(),
        "env": env,
    })
}

fn print_text(plan: &LaunchPlan) {
    println!("Target:  {} ({})", plan.target.display(), plan.kind);
    println!("Policy:  {}", plan.policy);
    let args: Vec<String> = plan.args.iter().map(|a| format!("{a:?}")).collect();
    println!("Args:    {}", args.join(" "));
    if !plan.unset.is_empty() {
        let unset: Vec<String> = plan.unset.iter().map(|v| lossy(v)).collect();
        println!("Unset:   {}", unset.join(" "));
    }
    println!("Environment:");
    for (k, v) in plan.env.iter() {
        println!("  {}={}", k.to_string_lossy(), v.to_string_lossy());
    }
}
