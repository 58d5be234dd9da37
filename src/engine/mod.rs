//! Rule runtime and evaluator.
//!
//! The engine owns the compiled document set and the live rules built
//! from it. One logical thread drives it; the only asynchronous edge is
//! document compilation, delivered through [`Engine::complete`] by
//! whoever loads the text. Trigger firings queue onto an internal
//! channel and are drained by [`Engine::process_events`].

mod rule;
mod traits;

pub use rule::{ActionOutcome, FireReport, Rule};
pub use traits::{Action, Condition, FireSignal, FiringContext, Trigger};

use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver, Sender};

use chrono::{DateTime, Local};
use colored::Colorize;

use crate::document::{parse, Document};
use crate::error::RulebotError;
use crate::registry::Registry;
use crate::store::RuleStore;

use traits::FireEvent;

/// Engine lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No live rules; documents may be retained from earlier loads.
    Stopped,
    /// Compiles submitted, waiting for every completion.
    Loading,
    /// Live rules armed and firing.
    Running,
}

/// The rule engine.
pub struct Engine {
    registry: Rc<Registry>,
    state: EngineState,
    pending: HashSet<String>,
    documents: BTreeMap<String, Document>,
    component_errors: BTreeMap<String, String>,
    rules: BTreeMap<String, Rule>,
    rule_errors: BTreeMap<String, String>,
    generation: u64,
    fire_sender: Sender<FireEvent>,
    fire_receiver: Receiver<FireEvent>,
}

impl Engine {
    /// Create a stopped engine over a registry handle.
    #[must_use]
    pub fn new(registry: Rc<Registry>) -> Self {
        let (fire_sender, fire_receiver) = channel();
        Self {
            registry,
            state: EngineState::Stopped,
            pending: HashSet::new(),
            documents: BTreeMap::new(),
            component_errors: BTreeMap::new(),
            rules: BTreeMap::new(),
            rule_errors: BTreeMap::new(),
            generation: 0,
            fire_sender,
            fire_receiver,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// Whether live rules are armed.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    /// Submit a document id for compilation.
    ///
    /// The caller must later deliver the result through [`complete`].
    /// Ids already pending, compiled or failed are rejected as a no-op
    /// until a reload; returns whether the submission was accepted.
    ///
    /// [`complete`]: Engine::complete
    pub fn submit(&mut self, id: &str) -> bool {
        if self.pending.contains(id)
            || self.documents.contains_key(id)
            || self.component_errors.contains_key(id)
        {
            return false;
        }
        self.pending.insert(id.to_string());
        if self.state == EngineState::Stopped {
            self.state = EngineState::Loading;
        }
        true
    }

    /// Deliver a compile completion: the document text, or a load error.
    ///
    /// Completions for ids that are no longer pending — cleared by
    /// [`stop`] — are ignored, so a stop during loading can never be
    /// followed by a spurious transition to running. Once the last
    /// pending completion arrives the engine activates.
    ///
    /// [`stop`]: Engine::stop
    pub fn complete(&mut self, id: &str, result: Result<String, String>) {
        if !self.pending.remove(id) {
            return;
        }
        match result {
            Ok(text) => match parse(&text) {
                Ok(document) => {
                    self.documents.insert(id.to_string(), document);
                }
                Err(err) => {
                    self.component_errors.insert(id.to_string(), err.to_string());
                }
            },
            Err(message) => {
                self.component_errors.insert(id.to_string(), message);
            }
        }
        if self.state == EngineState::Loading && self.pending.is_empty() {
            self.activate();
        }
    }

    /// Instantiate rules from the retained document set.
    ///
    /// With compiles still pending this only records the intent; the
    /// loading barrier activates the engine when the last completion
    /// arrives.
    pub fn start(&mut self) {
        if self.pending.is_empty() {
            self.activate();
        } else {
            self.state = EngineState::Loading;
        }
    }

    /// Drop every live rule and in-flight load.
    ///
    /// Compiled documents are retained; [`start`] re-instantiates them.
    /// The generation bump invalidates every armed signal handle.
    ///
    /// [`start`]: Engine::start
    pub fn stop(&mut self) {
        for rule in self.rules.values_mut() {
            rule.disarm();
        }
        self.rules.clear();
        self.rule_errors.clear();
        self.pending.clear();
        self.generation += 1;
        self.state = EngineState::Stopped;
    }

    /// Submit and complete every rule in a store.
    ///
    /// # Errors
    ///
    /// Fails only if the store cannot be listed; per-rule read and parse
    /// failures are recorded as component errors.
    pub fn load_from(&mut self, store: &dyn RuleStore) -> Result<(), RulebotError> {
        for id in store.list()? {
            if self.submit(&id) {
                let result = store.read(&id).map_err(|err| err.to_string());
                self.complete(&id, result);
            }
        }
        Ok(())
    }

    /// Stop, forget every compiled document, and load the store afresh.
    ///
    /// # Errors
    ///
    /// Fails only if the store cannot be listed.
    pub fn reload(&mut self, store: &dyn RuleStore) -> Result<(), RulebotError> {
        self.stop();
        self.documents.clear();
        self.component_errors.clear();
        self.load_from(store)
    }

    fn activate(&mut self) {
        self.rule_errors.clear();
        self.generation += 1;

        let registry = Rc::clone(&self.registry);
        let built: Vec<(String, Result<Rule, RulebotError>)> = self
            .documents
            .iter()
            .map(|(id, document)| (id.clone(), Rule::from_document(document, &registry)))
            .collect();

        for (id, result) in built {
            match result {
                Ok(mut rule) => {
                    // Validation gate: a rule needs a trigger and at
                    // least one action to enter the running set.
                    if !rule.has_trigger() || rule.action_count() == 0 {
                        self.rule_errors.insert(
                            id,
                            "Invalid rule: check that trigger and actions are set".to_string(),
                        );
                        continue;
                    }
                    rule.arm(FireSignal::new(
                        id.clone(),
                        self.generation,
                        self.fire_sender.clone(),
                    ));
                    self.rules.insert(id, rule);
                }
                Err(err) => {
                    self.rule_errors.insert(id, err.to_string());
                }
            }
        }
        self.state = EngineState::Running;
    }

    /// Drain queued trigger events and fire the matching rules.
    ///
    /// Events from stopped generations are discarded. Action failures
    /// are logged and recorded in the returned reports; they never
    /// propagate.
    pub fn process_events(&mut self) -> Vec<FireReport> {
        let mut reports = Vec::new();
        while let Ok(event) = self.fire_receiver.try_recv() {
            if event.generation != self.generation {
                continue;
            }
            let Some(rule) = self.rules.get_mut(&event.rule_id) else {
                continue;
            };
            let context = FiringContext::new(rule.name().to_string());
            let report = rule.fire(&context);
            for outcome in &report.actions {
                if let Err(err) = &outcome.result {
                    eprintln!(
                        "Warning: action {} of rule {} failed: {err}",
                        outcome.type_name, event.rule_id
                    );
                }
            }
            reports.push(report);
        }
        reports
    }

    /// Heartbeat: let time-driven triggers fire, then process events.
    pub fn tick(&mut self, now: DateTime<Local>) -> Vec<FireReport> {
        for rule in self.rules.values_mut() {
            rule.tick(now);
        }
        self.process_events()
    }

    /// Live rule for an id, if it passed validation.
    #[must_use]
    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rules.get(id)
    }

    /// Compiled document for an id.
    #[must_use]
    pub fn document(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    /// Compile error for an id, if its document failed to load.
    #[must_use]
    pub fn component_error(&self, id: &str) -> Option<&str> {
        self.component_errors.get(id).map(String::as_str)
    }

    /// Validation or instantiation error for an id.
    #[must_use]
    pub fn rule_error(&self, id: &str) -> Option<&str> {
        self.rule_errors.get(id).map(String::as_str)
    }

    /// Ids of live rules, in order.
    #[must_use]
    pub fn rule_ids(&self) -> Vec<&str> {
        self.rules.keys().map(String::as_str).collect()
    }

    /// Every id the engine knows about: compiled, failed or live.
    #[must_use]
    pub fn known_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .documents
            .keys()
            .chain(self.component_errors.keys())
            .map(String::as_str)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Render a per-rule load report for terminal display.
#[must_use]
pub fn format_load_report(engine: &Engine) -> String {
    let mut lines = Vec::new();
    let ids = engine.known_ids();
    let running = ids
        .iter()
        .filter(|id| engine.rule(id).is_some())
        .count();

    lines.push(format!("Rules: {running}/{} running", ids.len()));
    lines.push("─".repeat(50));

    if ids.is_empty() {
        lines.push("  No rules found".dimmed().to_string());
        return lines.join("\n");
    }

    for id in ids {
        if let Some(rule) = engine.rule(id) {
            let name = if rule.name().is_empty() {
                "(unnamed)".dimmed().to_string()
            } else {
                rule.name().to_string()
            };
            lines.push(format!(
                "{} {id}: {name} ({} actions)",
                "✓".green(),
                rule.action_count()
            ));
        } else if let Some(error) = engine.component_error(id) {
            lines.push(format!("{} {id}: {error}", "✗".red()));
        } else if let Some(error) = engine.rule_error(id) {
            lines.push(format!("{} {id}: {error}", "✗".red()));
        } else {
            lines.push(format!("{} {id}: not started", "-".dimmed()));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    use crate::error::ActionError;
    use crate::registry::{ComponentSpec, PropertySchema};
    use crate::store::MockRuleStore;

    struct CapturingTrigger {
        signals: Rc<RefCell<Vec<FireSignal>>>,
    }
    impl Trigger for CapturingTrigger {
        fn arm(&mut self, signal: FireSignal) {
            self.signals.borrow_mut().push(signal);
        }
    }

    struct StaticCondition {
        valid: bool,
    }
    impl Condition for StaticCondition {
        fn is_valid(&self, _context: &FiringContext) -> bool {
            self.valid
        }
    }

    struct CountingAction {
        counter: Rc<Cell<u32>>,
        fail: bool,
    }
    impl Action for CountingAction {
        fn execute(&mut self, _context: &FiringContext) -> Result<(), ActionError> {
            if self.fail {
                Err(ActionError::new("deliberate failure"))
            } else {
                self.counter.set(self.counter.get() + 1);
                Ok(())
            }
        }
    }

    struct Fixture {
        engine: Engine,
        signals: Rc<RefCell<Vec<FireSignal>>>,
        counter: Rc<Cell<u32>>,
    }

    fn fixture() -> Fixture {
        let signals = Rc::new(RefCell::new(Vec::new()));
        let counter = Rc::new(Cell::new(0));

        let mut registry = Registry::new();
        let captured = Rc::clone(&signals);
        registry
            .register(ComponentSpec::trigger("TestTrigger", move |_| {
                Box::new(CapturingTrigger {
                    signals: Rc::clone(&captured),
                })
            }))
            .expect("register TestTrigger");
        registry
            .register(
                ComponentSpec::condition("StaticCondition", |bag| {
                    Box::new(StaticCondition {
                        valid: bag.bool_or("valid", false),
                    })
                })
                .with_property(PropertySchema::bool("valid", "Validity")),
            )
            .expect("register StaticCondition");
        let good = Rc::clone(&counter);
        registry
            .register(ComponentSpec::action("GoodAction", move |_| {
                Box::new(CountingAction {
                    counter: Rc::clone(&good),
                    fail: false,
                })
            }))
            .expect("register GoodAction");
        let bad = Rc::clone(&counter);
        registry
            .register(ComponentSpec::action("BadAction", move |_| {
                Box::new(CountingAction {
                    counter: Rc::clone(&bad),
                    fail: true,
                })
            }))
            .expect("register BadAction");

        Fixture {
            engine: Engine::new(Rc::new(registry)),
            signals,
            counter,
        }
    }

    const VALID_DOC: &str =
        "Rule { name: \"valid\" trigger: TestTrigger { } actions: [ GoodAction { } ] }";
    const NO_TRIGGER_DOC: &str = "Rule { name: \"broken\" actions: [ GoodAction { } ] }";

    #[test]
    fn test_loading_barrier() {
        let mut fixture = fixture();
        let engine = &mut fixture.engine;

        assert!(engine.submit("a"));
        assert!(engine.submit("b"));
        assert!(engine.submit("c"));
        assert_eq!(engine.state(), EngineState::Loading);

        engine.complete("a", Ok(VALID_DOC.to_string()));
        engine.complete("b", Ok(VALID_DOC.to_string()));
        // Two of three completions: still loading.
        assert_eq!(engine.state(), EngineState::Loading);

        engine.complete("c", Ok(VALID_DOC.to_string()));
        assert_eq!(engine.state(), EngineState::Running);
        assert_eq!(engine.rule_ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_duplicate_submit_rejected() {
        let mut fixture = fixture();
        let engine = &mut fixture.engine;

        assert!(engine.submit("a"));
        assert!(!engine.submit("a"));
        engine.complete("a", Ok(VALID_DOC.to_string()));
        assert!(!engine.submit("a"));
    }

    #[test]
    fn test_stop_mid_loading_ignores_late_completions() {
        let mut fixture = fixture();
        let engine = &mut fixture.engine;

        engine.submit("a");
        engine.submit("b");
        engine.complete("a", Ok(VALID_DOC.to_string()));
        engine.stop();
        assert_eq!(engine.state(), EngineState::Stopped);

        // The late completion must not resurrect the load.
        engine.complete("b", Ok(VALID_DOC.to_string()));
        assert_eq!(engine.state(), EngineState::Stopped);
        assert!(engine.document("b").is_none());
    }

    #[test]
    fn test_validation_gate_isolates_invalid_rules() {
        let mut fixture = fixture();
        let engine = &mut fixture.engine;

        engine.submit("good");
        engine.submit("bad");
        engine.complete("good", Ok(VALID_DOC.to_string()));
        engine.complete("bad", Ok(NO_TRIGGER_DOC.to_string()));

        assert_eq!(engine.state(), EngineState::Running);
        assert!(engine.rule("good").is_some());
        assert!(engine.rule("bad").is_none());
        let error = engine.rule_error("bad").expect("error recorded");
        assert!(error.contains("trigger and actions"));
    }

    #[test]
    fn test_parse_failure_isolated_as_component_error() {
        let mut fixture = fixture();
        let engine = &mut fixture.engine;

        engine.submit("good");
        engine.submit("broken");
        engine.complete("good", Ok(VALID_DOC.to_string()));
        engine.complete("broken", Ok("Rule {".to_string()));

        assert_eq!(engine.state(), EngineState::Running);
        assert!(engine.rule("good").is_some());
        assert!(engine.component_error("broken").is_some());
    }

    #[test]
    fn test_firing_continues_past_failures() {
        let mut fixture = fixture();
        let engine = &mut fixture.engine;

        let doc = "Rule { trigger: TestTrigger { } \
                   actions: [ BadAction { }, GoodAction { } ] }";
        engine.submit("r");
        engine.complete("r", Ok(doc.to_string()));
        assert!(engine.is_running());

        let signal = fixture.signals.borrow()[0].clone();
        signal.fire();
        let reports = engine.process_events();

        assert_eq!(reports.len(), 1);
        assert!(reports[0].fired);
        assert_eq!(reports[0].actions.len(), 2);
        assert!(reports[0].actions[0].result.is_err());
        assert!(reports[0].actions[1].result.is_ok());
        // The failing action never blocked the counting one.
        assert_eq!(fixture.counter.get(), 1);
    }

    #[test]
    fn test_condition_gates_firing_from_document() {
        let mut fixture = fixture();
        let engine = &mut fixture.engine;

        let doc = "Rule { trigger: TestTrigger { } \
                   condition: StaticCondition { valid: false } \
                   actions: [ GoodAction { } ] }";
        engine.submit("r");
        engine.complete("r", Ok(doc.to_string()));

        let signal = fixture.signals.borrow()[0].clone();
        signal.fire();
        let reports = engine.process_events();
        assert!(!reports[0].fired);
        assert_eq!(fixture.counter.get(), 0);
    }

    #[test]
    fn test_disabled_condition_is_bypassed_from_document() {
        let mut fixture = fixture();
        let engine = &mut fixture.engine;

        let doc = "Rule { trigger: TestTrigger { } \
                   condition: StaticCondition { valid: false\n enabled: false } \
                   actions: [ GoodAction { } ] }";
        engine.submit("r");
        engine.complete("r", Ok(doc.to_string()));

        let signal = fixture.signals.borrow()[0].clone();
        signal.fire();
        let reports = engine.process_events();
        assert!(reports[0].fired);
        assert_eq!(fixture.counter.get(), 1);
    }

    #[test]
    fn test_stale_generation_never_fires() {
        let mut fixture = fixture();
        let engine = &mut fixture.engine;

        engine.submit("r");
        engine.complete("r", Ok(VALID_DOC.to_string()));
        let stale = fixture.signals.borrow()[0].clone();

        engine.stop();
        engine.start();
        assert!(engine.is_running());

        // Handle from the stopped generation: discarded.
        stale.fire();
        assert!(engine.process_events().is_empty());
        assert_eq!(fixture.counter.get(), 0);

        // The re-armed handle fires normally.
        let fresh = fixture
            .signals
            .borrow()
            .last()
            .cloned()
            .expect("re-armed signal");
        fresh.fire();
        assert_eq!(engine.process_events().len(), 1);
        assert_eq!(fixture.counter.get(), 1);
    }

    #[test]
    fn test_disabled_rule_ignores_firing() {
        let mut fixture = fixture();
        let engine = &mut fixture.engine;

        let doc = "Rule { enabled: false trigger: TestTrigger { } \
                   actions: [ GoodAction { } ] }";
        engine.submit("r");
        engine.complete("r", Ok(doc.to_string()));

        let signal = fixture.signals.borrow()[0].clone();
        signal.fire();
        let reports = engine.process_events();
        assert!(!reports[0].fired);
        assert_eq!(fixture.counter.get(), 0);
    }

    #[test]
    fn test_load_from_store() {
        let mut fixture = fixture();
        let mut store = MockRuleStore::new();
        store
            .expect_list()
            .returning(|| Ok(vec!["rule_00000".to_string()]));
        store
            .expect_read()
            .returning(|_| Ok(VALID_DOC.to_string()));

        fixture.engine.load_from(&store).expect("load");
        assert!(fixture.engine.is_running());
        assert!(fixture.engine.rule("rule_00000").is_some());
    }

    #[test]
    fn test_reload_after_edit_replaces_documents() {
        let mut fixture = fixture();
        let engine = &mut fixture.engine;

        engine.submit("r");
        engine.complete("r", Ok(VALID_DOC.to_string()));
        assert!(engine.rule("r").is_some());

        let mut store = MockRuleStore::new();
        store
            .expect_list()
            .returning(|| Ok(vec!["r".to_string()]));
        store
            .expect_read()
            .returning(|_| Ok(NO_TRIGGER_DOC.to_string()));

        engine.reload(&store).expect("reload");
        assert!(engine.rule("r").is_none());
        assert!(engine.rule_error("r").is_some());
    }
}
