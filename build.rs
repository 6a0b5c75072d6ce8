use std::process::Command;

/// Output of `git rev-parse <args> HEAD`, or "unknown" outside a git checkout.
fn git_revision(args: &[&str]) -> String {
    Command::new("git")
        .arg("rev-parse")
        .args(args)
        .arg("HEAD")
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |hash| hash.trim().to_string())
}

fn main() {
    // shown by `--version` on the solver binaries
    println!("cargo:rustc-env=GIT_HASH={}", git_revision(&["--short"]));
    println!("cargo:rustc-env=GIT_HASH_FULL={}", git_revision(&[]));

    println!("cargo:rerun-if-changed=.git/HEAD");
}
