//! ユニットテスト共通のテストダブル

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::{AppError, Experiment, InvocationOptions, Node, Stage};
use crate::ports::{App, CommandFinder};

/// Ordered log of everything the fakes were asked to do.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

#[derive(Clone, Copy, PartialEq)]
enum Behaviour {
    Succeed,
    FailOn(Stage),
    Unresolved,
    Hang,
}

/// App that writes `"<name>:<stage>"` to its journal for every hook.
pub struct FakeApp {
    name: String,
    journal: Journal,
    behaviour: Behaviour,
    adds_node: Option<String>,
    checks_node: Option<String>,
    init_fails: bool,
}

impl FakeApp {
    pub fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            journal: Arc::clone(journal),
            behaviour: Behaviour::Succeed,
            adds_node: None,
            checks_node: None,
            init_fails: false,
        }
    }

    /// Fail with `AppError::Hook("<name> broke")` at `stage`.
    pub fn failing_on(mut self, stage: Stage) -> Self {
        self.behaviour = Behaviour::FailOn(stage);
        self
    }

    pub fn unresolved(mut self) -> Self {
        self.behaviour = Behaviour::Unresolved;
        self
    }

    /// Never return from a hook.
    pub fn hanging(mut self) -> Self {
        self.behaviour = Behaviour::Hang;
        self
    }

    /// Push a bare node into the topology on every hook.
    pub fn adding_node(mut self, hostname: &str) -> Self {
        self.adds_node = Some(hostname.to_string());
        self
    }

    /// Journal `"<name> sees <host> defaulted=<bool>"` on every hook.
    pub fn checking_defaults(mut self, hostname: &str) -> Self {
        self.checks_node = Some(hostname.to_string());
        self
    }

    /// `init` records itself, then fails with `AppError::Hook("init broke")`.
    pub fn failing_init(mut self) -> Self {
        self.init_fails = true;
        self
    }

    pub fn shared(self) -> Arc<dyn App> {
        Arc::new(self)
    }

    async fn hook(&self, stage: Stage, exp: &mut Experiment) -> Result<(), AppError> {
        self.journal.lock().unwrap().push(format!("{}:{stage}", self.name));
        if let Some(hostname) = &self.checks_node {
            let defaulted = exp
                .spec
                .topology
                .node(hostname)
                .is_some_and(|node| node.vm_type.is_some());
            self.journal
                .lock()
                .unwrap()
                .push(format!("{} sees {hostname} defaulted={defaulted}", self.name));
        }
        if let Some(hostname) = &self.adds_node {
            exp.spec.topology.nodes.push(Node::new(hostname.as_str()));
        }
        match self.behaviour {
            Behaviour::Succeed => Ok(()),
            Behaviour::FailOn(failing) if failing == stage => Err(AppError::hook(format!("{} broke", self.name))),
            Behaviour::FailOn(_) => Ok(()),
            Behaviour::Unresolved => Err(AppError::Unresolved(self.name.clone())),
            Behaviour::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl App for FakeApp {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&self, options: &InvocationOptions) -> Result<(), AppError> {
        self.journal.lock().unwrap().push(format!(
            "init:{} name={} dry_run={}",
            self.name,
            options.name().unwrap_or("-"),
            options.dry_run()
        ));
        if self.init_fails {
            return Err(AppError::hook("init broke"));
        }
        Ok(())
    }

    async fn configure(&self, exp: &mut Experiment) -> Result<(), AppError> {
        self.hook(Stage::Configure, exp).await
    }

    async fn pre_start(&self, exp: &mut Experiment) -> Result<(), AppError> {
        self.hook(Stage::PreStart, exp).await
    }

    async fn post_start(&self, exp: &mut Experiment) -> Result<(), AppError> {
        self.hook(Stage::PostStart, exp).await
    }

    async fn cleanup(&self, exp: &mut Experiment) -> Result<(), AppError> {
        self.hook(Stage::Cleanup, exp).await
    }
}

/// Finder over a fixed list of command names. Nothing is ever locatable.
pub struct FakeFinder {
    commands: Vec<String>,
}

impl FakeFinder {
    pub fn with(commands: &[&str]) -> Self {
        Self {
            commands: commands.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl CommandFinder for FakeFinder {
    fn find_commands_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.commands
            .iter()
            .filter_map(|c| c.strip_prefix(prefix))
            .map(str::to_string)
            .collect()
    }

    fn locate(&self, _command: &str) -> Option<PathBuf> {
        None
    }
}
