#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

pub struct TestContext {
    pub cmd: Command,
    pub dir: TempDir,
}

impl TestContext {
    /// A fresh command sharing this context's directory.
    pub fn new_cmd(&self) -> Command {
        let bin_path = env!("CARGO_BIN_EXE_ixrender");
        let mut cmd = Command::new(bin_path);
        cmd.timeout(Duration::from_secs(30));
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Write `contents` to `name` inside the context directory.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("Failed to write fixture");
        path
    }
}

pub fn ixrender() -> TestContext {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let bin_path: &str = env!("CARGO_BIN_EXE_ixrender");
    let mut cmd = Command::new(bin_path);
    cmd.timeout(Duration::from_secs(30));
    cmd.current_dir(dir.path());

    TestContext { cmd, dir }
}

pub const WEB_APP: &str = r#"
values:
  images:
    image: {repository: nginx, tag: latest}
  notes: "Open $URL"
containers:
  - name: web
    image: image
    configs:
      - {name: site, content: "root $document_root;", target: /etc/nginx/site.conf}
    expose:
      - {port: 8080}
    portals:
      - port: {port_number: 8080}
"#;
