use std::fmt::{Debug, Display};
use std::time::Duration;

use cipher_tunnel_core::prelude::{Metrics, Verdict};

use crate::config::HarnessConfig;
use crate::context::{RunnerContext, UserValuesConstraint};
use crate::init::init;
use crate::tools::OperationVariant;

pub type HookResult = anyhow::Result<()>;

/// What a case behaviour returns. An `Err` fails the case, unless it is a
/// [cipher_tunnel_core::prelude::BuildError], which aborts the run.
pub type CaseResult = anyhow::Result<CaseReport>;

pub type GlobalHookMut<RV> = fn(&mut RunnerContext<RV>) -> HookResult;
pub type CaseHookMut<RV, C> = fn(&mut RunnerContext<RV>, &C) -> CaseResult;

/// A case descriptor. Its [Display] output is the case label written to the report.
pub trait CaseConstraint: Display + Debug + 'static {
    /// Identifies the case in run results and summaries, so it must be unique within a scenario.
    ///
    /// Defaults to the trimmed label. Override it when labels repeat or carry padding.
    fn id(&self) -> String {
        self.to_string().trim().to_string()
    }
}

impl CaseConstraint for u64 {}

impl CaseConstraint for OperationVariant {}

/// The result of a case that ran to completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseReport {
    pub verdict: Verdict,
    /// Extra text written between the case label and the verdict, e.g. a row of timings.
    pub detail: Option<String>,
    pub timings: Vec<Metrics>,
}

impl CaseReport {
    pub fn new(verdict: Verdict) -> Self {
        Self {
            verdict,
            detail: None,
            timings: Vec::new(),
        }
    }

    /// `ok` if two artifacts were found to be identical, `ko` otherwise.
    pub fn from_equivalence(equivalent: bool) -> Self {
        Self::new(Verdict::from_equivalence(equivalent))
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_timings(mut self, timings: Vec<Metrics>) -> Self {
        self.timings = timings;
        self
    }

    /// The report line for this case: `<label>[ <detail>] <verdict>`.
    pub fn line(&self, label: &str) -> String {
        match &self.detail {
            Some(detail) => format!("{label} {detail} {}", self.verdict),
            None => format!("{label} {}", self.verdict),
        }
    }
}

/// The builder for a scenario definition.
///
/// This must be used at the start of a scenario binary to define the scenario that you want to run.
pub struct ScenarioDefinitionBuilder<RV: UserValuesConstraint, C: CaseConstraint> {
    /// The name of the scenario, which should be unique within the test suite. It names the
    /// working directory and the report file.
    ///
    /// Recommended value is `env!("CARGO_PKG_NAME")`.
    name: String,
    /// Resolved from the command line and environment, or supplied directly in tests.
    config: HarnessConfig,
    /// The cases to run, in order.
    cases: Vec<C>,
    /// Pause between cases, unless the user overrides it on the command line.
    default_cooldown: Option<Duration>,
    /// Global setup hook for this scenario. It will be run once, before the first case.
    ///
    /// This is where tools that every case shares should be built.
    setup_fn: Option<GlobalHookMut<RV>>,
    /// The behaviour run for each case.
    case_behaviour: Option<CaseHookMut<RV, C>>,
}

pub(crate) struct ScenarioDefinition<RV: UserValuesConstraint, C: CaseConstraint> {
    pub name: String,
    pub config: HarnessConfig,
    pub cases: Vec<C>,
    pub cooldown: Duration,
    pub setup_fn: Option<GlobalHookMut<RV>>,
    pub case_behaviour: CaseHookMut<RV, C>,
}

impl<RV: UserValuesConstraint, C: CaseConstraint> ScenarioDefinitionBuilder<RV, C> {
    /// Initialise a new scenario definition from a name and an explicit configuration.
    /// See the [ScenarioDefinitionBuilder::name] for more information about the name.
    pub fn new(name: &str, config: HarnessConfig) -> Self {
        Self {
            name: name.to_string(),
            config,
            cases: Vec::new(),
            default_cooldown: None,
            setup_fn: None,
            case_behaviour: None,
        }
    }

    /// Initialise logging, parse the command line and create a new scenario definition.
    pub fn new_with_init(name: &str) -> Self {
        Self::new(name, init())
    }

    /// Append cases to [ScenarioDefinitionBuilder::cases].
    pub fn with_cases(mut self, cases: impl IntoIterator<Item = C>) -> Self {
        self.cases.extend(cases);
        self
    }

    /// Set [ScenarioDefinitionBuilder::default_cooldown].
    pub fn with_default_cooldown_s(mut self, cooldown_s: u64) -> Self {
        self.default_cooldown = Some(Duration::from_secs(cooldown_s));
        self
    }

    /// Set the global setup hook [ScenarioDefinitionBuilder::setup_fn] for this scenario.
    pub fn use_setup(mut self, setup_fn: GlobalHookMut<RV>) -> Self {
        self.setup_fn = Some(setup_fn);
        self
    }

    /// Set the [ScenarioDefinitionBuilder::case_behaviour] for this scenario.
    pub fn use_case_behaviour(mut self, behaviour: CaseHookMut<RV, C>) -> Self {
        self.case_behaviour = Some(behaviour);
        self
    }

    pub(crate) fn build(self) -> anyhow::Result<ScenarioDefinition<RV, C>> {
        let case_behaviour = self.case_behaviour.ok_or_else(|| {
            anyhow::anyhow!("No case behaviour defined for scenario [{}]", self.name)
        })?;

        if self.cases.is_empty() {
            anyhow::bail!("Scenario [{}] has no cases to run", self.name);
        }

        let cooldown = self
            .config
            .cooldown
            .or(self.default_cooldown)
            .unwrap_or_default();

        Ok(ScenarioDefinition {
            name: self.name,
            config: self.config,
            cases: self.cases,
            cooldown,
            setup_fn: self.setup_fn,
            case_behaviour,
        })
    }
}
