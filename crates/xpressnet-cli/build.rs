use std::env;
use std::process::Command;

const UNKNOWN: &str = "unknown";
const SHORT_COMMIT_LEN: usize = 7;

/// Commit metadata embedded into `xpressnet --version`.
struct BuildInfo {
    commit: String,
    commit_full: String,
    commit_date: String,
}

impl BuildInfo {
    fn collect() -> Self {
        // CI checkouts may be shallow or detached; the SHA it exports wins.
        let commit_full = env::var("GITHUB_SHA")
            .ok()
            .map(|sha| sha.trim().to_string())
            .filter(|sha| !sha.is_empty())
            .or_else(|| git(&["rev-parse", "HEAD"]));
        let commit = commit_full
            .as_deref()
            .map(|sha| sha.chars().take(SHORT_COMMIT_LEN).collect::<String>());

        Self {
            commit: commit.unwrap_or_else(|| UNKNOWN.to_string()),
            commit_full: commit_full.unwrap_or_else(|| UNKNOWN.to_string()),
            commit_date: git(&["log", "-1", "--format=%cI"])
                .unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }

    fn emit(&self) {
        for (key, value) in [
            ("XPRESSNET_BUILD_COMMIT", &self.commit),
            ("XPRESSNET_BUILD_COMMIT_FULL", &self.commit_full),
            ("XPRESSNET_BUILD_DATE", &self.commit_date),
        ] {
            println!("cargo:rustc-env={key}={value}");
        }
    }
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=GITHUB_SHA");
    BuildInfo::collect().emit();
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (!value.is_empty()).then_some(value)
}
