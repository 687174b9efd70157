//! Recording fake for [`CommandRunner`] shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;

use buildcloud_common::error::{BuildcloudError, Result};
use buildcloud_runtime::process::{CommandRunner, render};

pub const STATUS_TWO_MACHINES: &str = "machines:\n  \"0\": {agent-state: started}\n  \"1\": {agent-state: started}\n";

type Rule = Box<dyn Fn(&str) -> bool>;
type Hook = (String, Box<dyn Fn()>);

/// Records every command and fails those matching a rule.
#[derive(Default)]
pub struct FakeRunner {
    calls: RefCell<Vec<String>>,
    failures: Vec<Rule>,
    hooks: Vec<Hook>,
    status: Option<String>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails every command whose rendered line equals `line`.
    pub fn fail_exact(mut self, line: &str) -> Self {
        let line = line.to_string();
        self.failures.push(Box::new(move |cmd| cmd == line));
        self
    }

    /// Fails every command whose rendered line starts with `prefix`.
    pub fn fail_prefix(mut self, prefix: &str) -> Self {
        let prefix = prefix.to_string();
        self.failures.push(Box::new(move |cmd| cmd.starts_with(&prefix)));
        self
    }

    /// Runs `action` right after the command rendered as `line` is issued.
    pub fn on_call(mut self, line: &str, action: impl Fn() + 'static) -> Self {
        self.hooks.push((line.to_string(), Box::new(action)));
        self
    }

    /// Output returned by `juju status`.
    pub fn status(mut self, yaml: &str) -> Self {
        self.status = Some(yaml.to_string());
        self
    }

    /// Records a marker line, e.g. where a workload ran.
    pub fn mark(&self, label: &str) {
        self.calls.borrow_mut().push(format!("# {label}"));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    pub fn position(&self, line: &str) -> Option<usize> {
        self.calls().iter().position(|c| c == line)
    }

    fn record(&self, argv: &[String]) -> Result<String> {
        let line = render(argv);
        self.calls.borrow_mut().push(line.clone());
        for (_, action) in self.hooks.iter().filter(|(on, _)| *on == line) {
            action();
        }
        if self.failures.iter().any(|rule| rule(&line)) {
            return Err(BuildcloudError::CommandFailed {
                command: line,
                code: Some(1),
            });
        }
        Ok(line)
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, argv: &[String]) -> Result<()> {
        self.record(argv).map(|_| ())
    }

    fn output(&self, argv: &[String]) -> Result<String> {
        let line = self.record(argv)?;
        if line == "juju --version" {
            return Ok("1.25.6-trusty-amd64\n".to_string());
        }
        if line.starts_with("juju status") {
            return Ok(self.status.clone().unwrap_or_default());
        }
        Ok(String::new())
    }
}
