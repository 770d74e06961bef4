use crate::error::Result;
use crate::exec::{CommandOutput, CommandRunner, CommandSpec, ToolLocator};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};

/// Mock runner for testing without spawning processes
///
/// Every invocation is recorded. Results are scripted per tool (looking
/// through `sudo`) and consumed in order; unscripted calls succeed with empty
/// output.
#[derive(Debug, Default)]
pub struct MockRunner {
    calls: RefCell<Vec<CommandSpec>>,
    responses: RefCell<HashMap<String, VecDeque<CommandOutput>>>,
}

impl MockRunner {
    /// Create a runner where every command succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next call to `tool`
    pub fn respond(&self, tool: impl Into<String>, output: CommandOutput) {
        self.responses
            .borrow_mut()
            .entry(tool.into())
            .or_default()
            .push_back(output);
    }

    /// Every recorded invocation, in order
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    /// Rendered command lines, in order
    pub fn command_lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(CommandSpec::display).collect()
    }

    /// Recorded invocations of one tool
    pub fn calls_to(&self, tool: &str) -> Vec<CommandSpec> {
        self.calls
            .borrow()
            .iter()
            .filter(|spec| spec.tool() == tool)
            .cloned()
            .collect()
    }

    pub fn ran(&self, tool: &str) -> bool {
        self.calls.borrow().iter().any(|spec| spec.tool() == tool)
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.calls.borrow_mut().push(spec.clone());
        let output = self
            .responses
            .borrow_mut()
            .get_mut(spec.tool())
            .and_then(VecDeque::pop_front)
            .unwrap_or_default();
        Ok(output)
    }
}

/// Fixed set of available tools
#[derive(Debug, Default, Clone)]
pub struct FixedTools {
    available: HashSet<String>,
}

impl FixedTools {
    pub fn new<I, S>(tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FixedTools {
            available: tools.into_iter().map(Into::into).collect(),
        }
    }

    /// Every tool the default configuration checks for
    pub fn all() -> Self {
        Self::new(["git", "dch", "dpkg-buildpackage", "patch"])
    }
}

impl ToolLocator for FixedTools {
    fn is_available(&self, tool: &str) -> bool {
        self.available.contains(tool)
    }
}
