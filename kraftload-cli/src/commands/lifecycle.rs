//! Lifecycle commands: status, versions, update, rollback, compute, readme.

use kraftload::catalog::HttpClient;
use kraftload::manager::{ArtifactStatus, LifecycleController};
use kraftload::version::Version;

use crate::error::CliError;
use crate::output::Output;

fn show(version: Option<&Version>) -> String {
    version
        .map(|v| v.to_string())
        .unwrap_or_else(|| "(none)".to_string())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Print installed versus published versions.
pub fn status<C: HttpClient>(
    ctl: &LifecycleController<C>,
    json: bool,
    out: &dyn Output,
) -> Result<(), CliError> {
    let status = ctl.status();

    if json {
        out.println(&serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    print_status(out, &status);
    Ok(())
}

fn print_status(out: &dyn Output, status: &ArtifactStatus) {
    out.header(&format!("Artifact: {}", status.artifact));
    out.field("Installed", &show(status.installed.as_ref()));
    out.field("Latest", &show(status.latest.as_ref()));
    out.field("Previous", &show(status.previous.as_ref()));
    out.field("Update available", yes_no(status.update_available));
    out.field("Rollback available", yes_no(status.rollback_available));
}

/// List remote and local versions, marking installed and previous.
pub fn versions<C: HttpClient>(ctl: &LifecycleController<C>, out: &dyn Output) -> Result<(), CliError> {
    let remote = ctl.available_versions();
    let local = ctl.installed_versions();
    let installed = local.last();
    let previous = local.len().checked_sub(2).and_then(|i| local.get(i));

    out.header("Remote versions");
    if remote.is_empty() {
        out.println("  (none available)");
    }
    for version in &remote {
        let marker = if local.contains(version) { " (local)" } else { "" };
        out.println(&format!("  {}{}", version, marker));
    }

    out.newline();
    out.header("Local versions");
    if local.is_empty() {
        out.println("  (none installed)");
    }
    for version in local.iter().rev() {
        let marker = if Some(version) == installed {
            " [installed]"
        } else if Some(version) == previous {
            " [previous]"
        } else {
            ""
        };
        out.println(&format!("  {}{}", version, marker));
    }

    Ok(())
}

/// Install and load the latest published version.
pub fn update<C: HttpClient>(ctl: &LifecycleController<C>, out: &dyn Output) -> Result<(), CliError> {
    let version = ctl.update()?;
    out.success(&format!("Updated {} to {}", ctl.config().artifact, version));
    Ok(())
}

/// Return to the previous installed version.
pub fn rollback<C: HttpClient>(ctl: &LifecycleController<C>, out: &dyn Output) -> Result<(), CliError> {
    let version = ctl.rollback()?;
    out.success(&format!("Rolled back {} to {}", ctl.config().artifact, version));
    Ok(())
}

/// Run an operation on the loaded version.
pub fn compute<C: HttpClient>(
    ctl: &LifecycleController<C>,
    op: &str,
    a: &str,
    b: &str,
    out: &dyn Output,
) -> Result<(), CliError> {
    let result = ctl.compute(op, a, b)?;
    out.println(&result.to_string());
    Ok(())
}

/// Print the README of a version.
pub fn readme<C: HttpClient>(
    ctl: &LifecycleController<C>,
    version: &str,
    out: &dyn Output,
) -> Result<(), CliError> {
    let version = Version::parse(version)?;
    match ctl.readme(&version)? {
        Some(text) => {
            for line in text.lines() {
                out.println(line);
            }
        }
        None => out.println("README not found."),
    }
    Ok(())
}
