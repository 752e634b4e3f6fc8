//! Generation pass orchestration.
//!
//! A pass runs scan, group, emit and normalize over one compilation and
//! buffers every unit and diagnostic. Nothing reaches the host until the whole
//! pass has completed, so a cancelled pass leaves the host untouched.
use crate::{
    config::{ConfigError, GeneratorConfig},
    diagnostic::Diagnostic,
    emit,
    group::{self, TypeGroup},
    marker::{self, MARKER_NAME, MarkerIdentity},
    model::{Compilation, ModulePath},
    normalize::{self, CancellationToken, NormalizeError},
    obs::{DebugSink, EventSink, GeneratorEvent, NoopSink},
    scan,
};
use proc_macro2::Ident;
use std::sync::Arc;
use thiserror::Error as ThisError;

///
/// GenerateError
///
/// Pass-fatal failures. Per-field and per-unit problems are diagnostics.
///

#[derive(Debug, ThisError)]
pub enum GenerateError {
    #[error("generator must be initialized before a pass can run")]
    NotInitialized,

    #[error("crate root already declares `{name}`; the marker cannot be injected")]
    MarkerConflict { name: String },

    #[error("generation pass cancelled")]
    Cancelled,

    #[error("marker definition is not valid source: {0}")]
    Marker(NormalizeError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

///
/// GeneratedUnit
///
/// One source unit handed to the host under a unique key.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedUnit {
    key: String,
    namespace: Option<ModulePath>,
    body: String,
}

impl GeneratedUnit {
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        namespace: Option<ModulePath>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            namespace,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Module the augmented type lives in; `None` at the crate root.
    #[must_use]
    pub const fn namespace(&self) -> Option<&ModulePath> {
        self.namespace.as_ref()
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    fn with_body(self, body: String) -> Self {
        Self { body, ..self }
    }
}

///
/// GeneratorHost
///
/// Receives the output of a completed pass.
///

pub trait GeneratorHost {
    fn add_source(&mut self, unit: GeneratedUnit);

    fn report(&mut self, diagnostic: Diagnostic);
}

///
/// MemoryHost
///
/// Host that keeps everything it is given, in delivery order.
///

#[derive(Debug, Default)]
pub struct MemoryHost {
    pub units: Vec<GeneratedUnit>,
    pub diagnostics: Vec<Diagnostic>,
}

impl MemoryHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn unit(&self, key: &str) -> Option<&GeneratedUnit> {
        self.units.iter().find(|unit| unit.key() == key)
    }

    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.units.iter().map(GeneratedUnit::key).collect()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }
}

impl GeneratorHost for MemoryHost {
    fn add_source(&mut self, unit: GeneratedUnit) {
        self.units.push(unit);
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

///
/// GeneratorState
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GeneratorState {
    Uninitialized,
    Initialized,
    Executed,
}

///
/// PassReport
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PassReport {
    /// Keys of the delivered units, marker first.
    pub units: Vec<String>,
    pub diagnostics: usize,
    pub errors: usize,
}

impl PassReport {
    #[must_use]
    pub const fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

///
/// ReactivePropertyGenerator
///

pub struct ReactivePropertyGenerator {
    config: GeneratorConfig,
    state: GeneratorState,
    sink: Arc<dyn EventSink>,
}

impl ReactivePropertyGenerator {
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        let sink: Arc<dyn EventSink> = if config.debug {
            Arc::new(DebugSink)
        } else {
            Arc::new(NoopSink)
        };

        Self {
            config,
            state: GeneratorState::Uninitialized,
            sink,
        }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub const fn state(&self) -> GeneratorState {
        self.state
    }

    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Register the marker definition. Calling it again is a no-op.
    pub fn initialize(&mut self) -> Result<(), GenerateError> {
        if self.state != GeneratorState::Uninitialized {
            return Ok(());
        }

        marker::register().map_err(GenerateError::Marker)?;
        self.state = GeneratorState::Initialized;
        self.sink.record(GeneratorEvent::MarkerRegistered);

        Ok(())
    }

    /// Run one pass over `compilation` and deliver its output to `host`.
    pub fn execute<H>(
        &mut self,
        compilation: &Compilation,
        host: &mut H,
        cancel: &CancellationToken,
    ) -> Result<PassReport, GenerateError>
    where
        H: GeneratorHost + ?Sized,
    {
        if self.state == GeneratorState::Uninitialized {
            return Err(GenerateError::NotInitialized);
        }
        let events_field = self.config.events_ident()?;
        if compilation.root_declares(MARKER_NAME) {
            return Err(GenerateError::MarkerConflict {
                name: MARKER_NAME.to_string(),
            });
        }
        let marker_unit = marker::unit().ok_or(GenerateError::NotInitialized)?;

        self.sink.record(GeneratorEvent::PassStart {
            files: compilation.files().len(),
        });

        let (units, diagnostics) = match self.run(compilation, &events_field, cancel) {
            Ok(output) => output,
            Err(err) => {
                self.sink.record(GeneratorEvent::PassCancelled);
                return Err(err);
            }
        };

        // deliver
        let mut report = PassReport::default();
        for diagnostic in diagnostics {
            self.sink.record(GeneratorEvent::Reported {
                diagnostic: &diagnostic,
            });
            report.diagnostics += 1;
            if diagnostic.is_error() {
                report.errors += 1;
            }
            host.report(diagnostic);
        }
        for unit in std::iter::once(marker_unit).chain(units) {
            report.units.push(unit.key().to_string());
            host.add_source(unit);
        }

        self.state = GeneratorState::Executed;
        self.sink.record(GeneratorEvent::PassFinish {
            units: report.units.len(),
            diagnostics: report.diagnostics,
        });

        Ok(report)
    }

    // run
    // scan -> group -> emit -> normalize, buffered
    fn run(
        &self,
        compilation: &Compilation,
        events_field: &Ident,
        cancel: &CancellationToken,
    ) -> Result<(Vec<GeneratedUnit>, Vec<Diagnostic>), GenerateError> {
        checkpoint(cancel)?;
        let scanned = scan::scan(compilation, &MarkerIdentity::new());
        let mut diagnostics = scanned.diagnostics;

        let groups = group::group(scanned.candidates);
        self.sink.record(GeneratorEvent::Scanned {
            candidates: groups.iter().map(|g| g.fields.len()).sum(),
            groups: groups.len(),
        });

        let keys = group::unit_keys(&groups);
        let mut units = Vec::with_capacity(groups.len());
        for (group, key) in groups.iter().zip(&keys) {
            checkpoint(cancel)?;

            if let Some(unit) = self.unit(group, key, events_field, cancel, &mut diagnostics)? {
                units.push(unit);
            }
        }
        checkpoint(cancel)?;

        Ok((units, diagnostics))
    }

    fn unit(
        &self,
        group: &TypeGroup,
        key: &str,
        events_field: &Ident,
        cancel: &CancellationToken,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Option<GeneratedUnit>, GenerateError> {
        let emission = emit::emit(group, key, events_field);
        diagnostics.extend(emission.diagnostics);

        let Some(unit) = emission.unit else {
            self.sink.record(GeneratorEvent::UnitSkipped { key });
            return Ok(None);
        };

        match normalize::normalize(key, unit.body(), cancel) {
            Ok(body) => {
                self.sink.record(GeneratorEvent::UnitEmitted {
                    key,
                    properties: emission.properties,
                });

                Ok(Some(unit.with_body(body)))
            }
            Err(NormalizeError::Cancelled) => Err(GenerateError::Cancelled),
            Err(err) => {
                diagnostics.push(Diagnostic::syntax(&err, key));

                Ok(None)
            }
        }
    }
}

impl Default for ReactivePropertyGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

fn checkpoint(cancel: &CancellationToken) -> Result<(), GenerateError> {
    cancel.check().map_err(|_| GenerateError::Cancelled)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticCode;
    use std::sync::Mutex;

    const SCENES: &str = "
        pub struct ReactivePropertyExample {
            #[ReactiveProperty]
            _reactiveField: f32,
            events: ReactivePropertyExampleEvents,
        }
    ";

    const EXPECTED_SCENES: &str = "\
/// Change events for the reactive properties of `ReactivePropertyExample`.
#[derive(Debug, Default)]
pub struct ReactivePropertyExampleEvents {
    /// Raised after `ReactiveField` changes.
    pub reactive_field_changed: ::reactive_property::ChangeEvent,
}

impl crate::scenes::ReactivePropertyExample {
    /// Subscribe to or raise `ReactiveFieldChanged`.
    pub const fn reactive_field_changed(&mut self) -> &mut ::reactive_property::ChangeEvent {
        &mut self.events.reactive_field_changed
    }

    /// Current value of `ReactiveField`, backed by `_reactiveField`.
    #[must_use]
    pub const fn reactive_field(&self) -> &f32 {
        &self._reactiveField
    }

    /// Set `ReactiveField`, raising `ReactiveFieldChanged` only when the value changes.
    #[allow(clippy::float_cmp)]
    pub fn set_reactive_field(&mut self, value: f32) {
        if self._reactiveField != value {
            self._reactiveField = value;
            self.events.reactive_field_changed.publish();
        }
    }
}
";

    fn compilation(sources: &[(&str, &str)]) -> Compilation {
        Compilation::from_sources(sources.iter().copied()).unwrap()
    }

    fn generator() -> ReactivePropertyGenerator {
        let mut generator = ReactivePropertyGenerator::default();
        generator.initialize().unwrap();
        generator
    }

    fn run(sources: &[(&str, &str)]) -> (PassReport, MemoryHost) {
        let mut host = MemoryHost::new();
        let report = generator()
            .execute(&compilation(sources), &mut host, &CancellationToken::new())
            .unwrap();

        (report, host)
    }

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<String>>);

    impl EventSink for RecordingSink {
        fn record(&self, event: GeneratorEvent<'_>) {
            if let Ok(mut events) = self.0.lock() {
                events.push(event.to_string());
            }
        }
    }

    #[test]
    fn reactive_field_unit_has_canonical_text() {
        let (report, host) = run(&[("scenes.rs", SCENES)]);

        assert_eq!(
            report.units,
            ["ReactivePropertyAttribute_g", "ReactivePropertyExample_Classes_g"]
        );
        assert_eq!(report.diagnostics, 0);

        let unit = host.unit("ReactivePropertyExample_Classes_g").unwrap();
        assert_eq!(unit.body(), EXPECTED_SCENES);
        assert_eq!(unit.namespace(), Some(&ModulePath::new(["scenes"])));
    }

    #[test]
    fn marker_unit_is_delivered_first() {
        let (_, host) = run(&[("lib.rs", "pub mod scenes;")]);

        assert_eq!(host.keys(), ["ReactivePropertyAttribute_g"]);
        let marker = &host.units[0];
        assert_eq!(marker.namespace(), None);
        assert!(marker.body().contains("pub struct ReactiveProperty {"));
    }

    #[test]
    fn underivable_names_report_and_valid_names_still_emit() {
        let (report, host) = run(&[(
            "lib.rs",
            "struct Point {
                #[ReactiveProperty] _x: i32,
                #[ReactiveProperty] _9: i32,
                events: PointEvents,
            }",
        )]);

        assert_eq!(report.errors, 1);
        let diagnostic = &host.diagnostics[0];
        assert_eq!(diagnostic.code, DiagnosticCode::MalformedName);
        assert_eq!(diagnostic.unit.as_deref(), Some("Point_Classes_g"));

        let body = host.unit("Point_Classes_g").unwrap().body();
        assert!(body.contains("impl Point {"));
        assert!(body.contains("pub fn set_x(&mut self, value: i32) {"));
        assert!(body.contains("pub x_changed: ::reactive_property::ChangeEvent,"));
    }

    #[test]
    fn two_fields_share_one_unit() {
        let (report, host) = run(&[(
            "game/player.rs",
            "struct Player {
                #[ReactiveProperty] _name: String,
                #[ReactiveProperty] _health: u32,
                events: PlayerEvents,
            }",
        )]);

        assert_eq!(report.units.len(), 2);
        let body = host.unit("Player_Classes_g").unwrap().body();
        assert!(body.contains("impl crate::game::player::Player {"));
        for method in [
            "pub const fn health(&self) -> &u32 {",
            "pub fn set_health(&mut self, value: u32) {",
            "pub const fn name(&self) -> &String {",
            "pub fn set_name(&mut self, value: String) {",
        ] {
            assert!(body.contains(method), "missing `{method}`");
        }
        assert!(body.find("health_changed") < body.find("name_changed"));
    }

    #[test]
    fn non_private_fields_produce_nothing() {
        let (report, host) = run(&[(
            "lib.rs",
            "pub struct S { #[ReactiveProperty] pub(crate) _value: u8 }",
        )]);

        assert_eq!(host.keys(), ["ReactivePropertyAttribute_g"]);
        assert_eq!(report.diagnostics, 0);
    }

    #[test]
    fn same_type_name_in_two_modules_gets_unique_keys() {
        let (report, _) = run(&[
            ("ui.rs", "struct Player { #[ReactiveProperty] _x: u8 }"),
            ("lib.rs", "struct Player { #[ReactiveProperty] _y: u8 }"),
        ]);

        assert_eq!(
            report.units,
            [
                "ReactivePropertyAttribute_g",
                "Player_Classes_g",
                "ui_Player_Classes_g"
            ]
        );
    }

    #[test]
    fn module_paths_that_flatten_alike_get_distinct_keys() {
        let owner = "struct T { #[ReactiveProperty] _a: u8 }";
        let (report, host) = run(&[("lib.rs", owner), ("a/b.rs", owner), ("a_b.rs", owner)]);

        assert_eq!(
            report.units,
            [
                "ReactivePropertyAttribute_g",
                "T_Classes_g",
                "a_b_T_Classes_g",
                "a_b_T_2_Classes_g"
            ]
        );
        assert!(host.unit("a_b_T_Classes_g").unwrap().body().contains("impl crate::a::b::T {"));
        assert!(host.unit("a_b_T_2_Classes_g").unwrap().body().contains("impl crate::a_b::T {"));
    }

    #[test]
    fn clashing_method_names_are_reported_not_emitted() {
        let (report, host) = run(&[(
            "lib.rs",
            "struct S {
                #[ReactiveProperty] _reactiveField: u8,
                #[ReactiveProperty] _reactive_field: u8,
                #[ReactiveProperty] _speed: f32,
                events: SEvents,
            }",
        )]);

        assert_eq!(report.errors, 2);
        assert!(
            host.diagnostics
                .iter()
                .all(|d| d.code == DiagnosticCode::MalformedName)
        );

        let body = host.unit("S_Classes_g").unwrap().body();
        assert!(!body.contains("reactive_field"));
        assert!(body.contains("pub fn set_speed(&mut self, value: f32) {"));
    }

    #[test]
    fn aliased_marker_is_matched_and_foreign_one_is_not() {
        let (report, _) = run(&[
            (
                "a.rs",
                "use crate::ReactiveProperty as Watch; struct A { #[Watch] _v: u8 }",
            ),
            (
                "b.rs",
                "use serde::ReactiveProperty; struct B { #[ReactiveProperty] _v: u8 }",
            ),
        ]);

        assert_eq!(
            report.units,
            ["ReactivePropertyAttribute_g", "A_Classes_g"]
        );
    }

    #[test]
    fn passes_are_byte_identical() {
        let sources = [
            ("scenes.rs", SCENES),
            (
                "lib.rs",
                "struct Root { #[ReactiveProperty] _a: bool, #[ReactiveProperty] _b: char }",
            ),
        ];
        let compilation = compilation(&sources);
        let mut generator = generator();

        let mut first = MemoryHost::new();
        let mut second = MemoryHost::new();
        generator
            .execute(&compilation, &mut first, &CancellationToken::new())
            .unwrap();
        generator
            .execute(&compilation, &mut second, &CancellationToken::new())
            .unwrap();

        assert_eq!(first.units, second.units);
        assert_eq!(first.diagnostics, second.diagnostics);
        assert_eq!(generator.state(), GeneratorState::Executed);
    }

    #[test]
    fn cancelled_pass_delivers_nothing() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut host = MemoryHost::new();
        let mut generator = generator();

        let compilation = compilation(&[("scenes.rs", SCENES)]);
        let result = generator.execute(&compilation, &mut host, &cancel);

        assert!(matches!(result, Err(GenerateError::Cancelled)));
        assert!(host.units.is_empty());
        assert!(host.diagnostics.is_empty());
        assert_eq!(generator.state(), GeneratorState::Initialized);
    }

    #[test]
    fn execute_before_initialize_fails() {
        let mut generator = ReactivePropertyGenerator::default();
        let mut host = MemoryHost::new();

        let result = generator.execute(
            &compilation(&[("scenes.rs", SCENES)]),
            &mut host,
            &CancellationToken::new(),
        );

        assert!(matches!(result, Err(GenerateError::NotInitialized)));
        assert_eq!(generator.state(), GeneratorState::Uninitialized);
    }

    #[test]
    fn initialize_is_idempotent() {
        let mut generator = ReactivePropertyGenerator::default();
        generator.initialize().unwrap();
        generator.initialize().unwrap();

        assert_eq!(generator.state(), GeneratorState::Initialized);
    }

    #[test]
    fn root_item_named_like_the_marker_is_a_conflict() {
        let mut host = MemoryHost::new();
        let result = generator().execute(
            &compilation(&[("lib.rs", "pub struct ReactiveProperty;")]),
            &mut host,
            &CancellationToken::new(),
        );

        assert!(matches!(result, Err(GenerateError::MarkerConflict { .. })));
        assert!(host.units.is_empty());
    }

    #[test]
    fn root_import_named_like_the_marker_is_a_conflict() {
        let mut host = MemoryHost::new();
        let result = generator().execute(
            &compilation(&[
                ("lib.rs", "use other::ReactiveProperty;"),
                ("scenes.rs", SCENES),
            ]),
            &mut host,
            &CancellationToken::new(),
        );

        assert!(matches!(
            result,
            Err(GenerateError::MarkerConflict { ref name }) if name == "ReactiveProperty"
        ));
        assert!(host.units.is_empty());
    }

    #[test]
    fn invalid_events_field_is_fatal() {
        let config = GeneratorConfig {
            events_field: "not an ident".to_string(),
            ..GeneratorConfig::default()
        };
        let mut generator = ReactivePropertyGenerator::new(config);
        generator.initialize().unwrap();

        let result = generator.execute(
            &compilation(&[("scenes.rs", SCENES)]),
            &mut MemoryHost::new(),
            &CancellationToken::new(),
        );

        assert!(matches!(result, Err(GenerateError::Config(_))));
    }

    #[test]
    fn events_reach_the_sink() {
        let sink = Arc::new(RecordingSink::default());
        let mut generator = ReactivePropertyGenerator::default().with_sink(sink.clone());
        generator.initialize().unwrap();
        generator
            .execute(
                &compilation(&[("scenes.rs", SCENES)]),
                &mut MemoryHost::new(),
                &CancellationToken::new(),
            )
            .unwrap();

        let events = sink.0.lock().unwrap();
        assert_eq!(
            events.first().map(String::as_str),
            Some("marker definition registered")
        );
        assert!(events.iter().any(|e| e == "pass start: 1 file(s)"));
        assert!(
            events
                .iter()
                .any(|e| e == "emitted ReactivePropertyExample_Classes_g with 1 propert(ies)")
        );
        assert_eq!(
            events.last().map(String::as_str),
            Some("pass finish: 2 unit(s), 0 diagnostic(s)")
        );
    }
}
